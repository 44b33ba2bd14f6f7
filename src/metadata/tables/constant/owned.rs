use std::sync::Arc;

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        streams::Heaps,
        tables::{
            CodedIndex, CodedIndexType, ConstantRaw, ConstantValue, LazyValue, MetadataEntity,
            TableId,
        },
        token::Token,
    },
    Error, Result,
};

/// The default value of a field, parameter or property.
pub struct Constant {
    token: Token,
    element_type: u8,
    padding: u8,
    parent: CodedIndex,
    value: LazyValue<ConstantValue>,
    heaps: Option<Arc<Heaps>>,
    raw: ConstantRaw,
    dirty: bool,
}

impl Constant {
    pub(crate) fn new(parent: CodedIndex, value: ConstantValue) -> Self {
        Constant {
            token: Token::default(),
            element_type: value.element_type(),
            padding: 0,
            parent,
            value: LazyValue::resolved(value),
            heaps: None,
            raw: ConstantRaw::default(),
            dirty: true,
        }
    }

    /// The `ELEMENT_TYPE_*` of the value
    #[must_use]
    pub fn element_type(&self) -> u8 {
        self.element_type
    }

    /// The row this value belongs to
    #[must_use]
    pub fn parent(&self) -> &CodedIndex {
        &self.parent
    }

    /// Move the value to another owner.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] unless `parent` is a `Field`, `Param` or
    /// `Property` token.
    pub fn set_parent(&mut self, parent: Token) -> Result<()> {
        self.parent = coded_parent(parent, CodedIndexType::HasConstant)?;
        self.dirty = true;
        Ok(())
    }

    /// The decoded value.
    ///
    /// # Errors
    /// Returns an error if the blob is out of range or does not match the element type.
    pub fn value(&self) -> Result<&ConstantValue> {
        self.value.get_or_resolve(|offset| {
            let heaps = self.heaps.as_deref().ok_or(Error::Detached(self.token))?;
            ConstantValue::decode(self.element_type, heaps.blob.get(offset as usize)?)
        })
    }

    /// Replace the value; the element type follows it
    pub fn set_value(&mut self, value: ConstantValue) {
        self.element_type = value.element_type();
        self.value.set(value);
        self.dirty = true;
    }
}

/// Turn `token` into a `ci_type` reference, or explain why it cannot be one
pub(crate) fn coded_parent(token: Token, ci_type: CodedIndexType) -> Result<CodedIndex> {
    match token.table_id() {
        Some(table) if ci_type.tag_of(table).is_some() && token.is_assigned() => {
            Ok(CodedIndex::new(table, token.row()))
        }
        _ => Err(Error::ModificationInvalid(format!(
            "{token} is not a valid {ci_type:?} target"
        ))),
    }
}

impl MetadataEntity for Constant {
    type Raw = ConstantRaw;
    const TABLE_ID: TableId = TableId::Constant;

    fn from_raw(raw: ConstantRaw, context: &ReadingContext) -> Result<Self> {
        context.check_coded(&raw.parent)?;
        context.check_blob(raw.value)?;

        Ok(Constant {
            token: raw.token,
            element_type: raw.base,
            padding: raw.padding,
            parent: raw.parent,
            value: LazyValue::unresolved(raw.value),
            heaps: Some(context.heaps().clone()),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let value = match context.reusable(self.value.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_blob(&self.value()?.encode())?,
        };

        self.raw = ConstantRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            base: self.element_type,
            padding: self.padding,
            parent: self.parent,
            value,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &ConstantRaw {
        &self.raw
    }

    fn token(&self) -> Token {
        self.token
    }

    fn assign_token(&mut self, token: Token) {
        if self.token != token {
            self.token = token;
            self.dirty = true;
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn resolve_all(&self) -> Result<()> {
        self.value().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{config::BuildConfig, signatures::ELEMENT_TYPE},
        test::factories::{heaps, reading_context},
    };

    fn parsed_constant() -> (Arc<Heaps>, Constant) {
        let heaps = heaps(b"\0", &[0x00, 0x04, 0x2a, 0x00, 0x00, 0x00]);
        let context = reading_context(heaps.clone(), &[(TableId::Field, 1)]);
        let raw = ConstantRaw {
            rid: 1,
            token: Token::from_parts(TableId::Constant, 1),
            base: ELEMENT_TYPE::I4,
            parent: CodedIndex::new(TableId::Field, 1),
            value: 1,
            ..ConstantRaw::default()
        };
        (heaps.clone(), Constant::from_raw(raw, &context).unwrap())
    }

    #[test]
    fn value_is_lazy() {
        let (heaps, constant) = parsed_constant();
        assert_eq!(heaps.blob.lookups(), 0);
        assert_eq!(constant.value().unwrap(), &ConstantValue::I4(42));
        assert_eq!(constant.value().unwrap(), &ConstantValue::I4(42));
        assert_eq!(heaps.blob.lookups(), 1);
        assert_eq!(constant.parent().token, Token::from_parts(TableId::Field, 1));
    }

    #[test]
    fn dangling_parent() {
        let heaps = heaps(b"\0", &[0x00]);
        let context = reading_context(heaps, &[(TableId::Field, 1)]);
        let raw = ConstantRaw {
            rid: 1,
            token: Token::from_parts(TableId::Constant, 1),
            base: ELEMENT_TYPE::I4,
            parent: CodedIndex::new(TableId::Field, 5),
            ..ConstantRaw::default()
        };
        assert!(Constant::from_raw(raw, &context).is_err());
    }

    #[test]
    fn set_value() {
        let (heaps, mut constant) = parsed_constant();
        constant.set_value(ConstantValue::String("Hi".to_string()));
        assert!(constant.is_dirty());
        assert_eq!(constant.element_type(), ELEMENT_TYPE::STRING);

        let mut context = BuildingContext::new(heaps, BuildConfig::default());
        constant.update_raw(&mut context).unwrap();
        assert_eq!(constant.raw().base, ELEMENT_TYPE::STRING);
        assert_eq!(constant.raw().value, 6);

        let streams = context.into_streams();
        assert_eq!(&streams.blob[6..], &[0x04, 0x48, 0x00, 0x69, 0x00]);
    }

    #[test]
    fn invalid_parent() {
        let (_, mut constant) = parsed_constant();
        assert!(constant
            .set_parent(Token::from_parts(TableId::TypeDef, 1))
            .is_err());
        assert!(constant
            .set_parent(Token::from_parts(TableId::Field, 0))
            .is_err());
        constant
            .set_parent(Token::from_parts(TableId::Property, 2))
            .unwrap();
        assert_eq!(constant.parent().tag, TableId::Property);
    }
}
