//! Builder for fresh [`Constant`] entities.

use crate::{
    metadata::{
        tables::{coded_parent, CodedIndexType, Constant, ConstantValue},
        token::Token,
    },
    Error, Result,
};

/// Builder for [`Constant`] entities. Parent and value are required.
///
/// To attach a default value to a field and keep the field's flags and cached relation in
/// step, use [`crate::metadata::MetadataHeader::attach_constant`] instead.
#[derive(Debug, Clone, Default)]
pub struct ConstantBuilder {
    parent: Option<Token>,
    value: Option<ConstantValue>,
}

impl ConstantBuilder {
    /// Creates a new `ConstantBuilder`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owner: a `Field`, `Param` or `Property` token
    #[must_use]
    pub fn parent(mut self, parent: Token) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the value
    #[must_use]
    pub fn value(mut self, value: ConstantValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Builds the constant.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if parent or value is missing, or the
    /// parent cannot own a constant.
    pub fn build(self) -> Result<Constant> {
        let parent = self
            .parent
            .ok_or_else(|| Error::ModificationInvalid("Constant parent is required".to_string()))?;
        let value = self
            .value
            .ok_or_else(|| Error::ModificationInvalid("Constant value is required".to_string()))?;

        let parent = coded_parent(parent, CodedIndexType::HasConstant)?;
        Ok(Constant::new(parent, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{signatures::ELEMENT_TYPE, tables::TableId};

    #[test]
    fn builds_fresh_constant() -> Result<()> {
        let constant = ConstantBuilder::new()
            .parent(Token::from_parts(TableId::Field, 3))
            .value(ConstantValue::U8(7))
            .build()?;

        assert_eq!(constant.element_type(), ELEMENT_TYPE::U8);
        assert_eq!(constant.value()?, &ConstantValue::U8(7));
        assert_eq!(constant.parent().row, 3);
        Ok(())
    }

    #[test]
    fn missing_values() {
        assert!(matches!(
            ConstantBuilder::new().value(ConstantValue::Null).build(),
            Err(Error::ModificationInvalid(_))
        ));
        assert!(matches!(
            ConstantBuilder::new()
                .parent(Token::from_parts(TableId::Field, 1))
                .build(),
            Err(Error::ModificationInvalid(_))
        ));
        assert!(matches!(
            ConstantBuilder::new()
                .parent(Token::from_parts(TableId::Module, 1))
                .value(ConstantValue::Null)
                .build(),
            Err(Error::ModificationInvalid(_))
        ));
    }
}
