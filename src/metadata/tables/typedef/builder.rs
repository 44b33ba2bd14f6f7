//! Builder for fresh [`TypeDef`] entities.

use crate::{
    metadata::{
        tables::{extends_index, TypeDef},
        token::Token,
    },
    Error, Result,
};

/// Builder for [`TypeDef`] entities.
///
/// Only the name is required. The field run of the new type is assigned when it is inserted
/// with [`crate::metadata::MetadataHeader::add_type`].
///
/// # Examples
///
/// ```rust
/// use cilmeta::prelude::*;
///
/// let point = TypeDefBuilder::new()
///     .name("Point")
///     .namespace("Geometry")
///     .flags(TypeAttributes::PUBLIC | TypeAttributes::SEQUENTIAL_LAYOUT)
///     .build()?;
/// assert_eq!(point.full_name()?, "Geometry.Point");
/// # Ok::<(), cilmeta::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeDefBuilder {
    name: Option<String>,
    namespace: Option<String>,
    extends: Option<Token>,
    flags: Option<u32>,
}

impl TypeDefBuilder {
    /// Creates a new `TypeDefBuilder`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simple name of the type (without namespace)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the namespace, empty by default
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the base type (a `TypeDef`, `TypeRef` or `TypeSpec` token)
    #[must_use]
    pub fn extends(mut self, base: Token) -> Self {
        self.extends = Some(base);
        self
    }

    /// Sets the `TypeAttributes` bitmask
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Builds the type.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if the name is missing or empty, or the base
    /// type token does not name a type.
    pub fn build(self) -> Result<TypeDef> {
        let name = self
            .name
            .ok_or_else(|| Error::ModificationInvalid("Type name is required".to_string()))?;
        if name.is_empty() {
            return Err(Error::ModificationInvalid(
                "Type name cannot be empty".to_string(),
            ));
        }

        let extends = extends_index(self.extends)?;

        Ok(TypeDef::new(
            self.flags.unwrap_or(0),
            name,
            self.namespace.unwrap_or_default(),
            extends,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataEntity, TableId, TypeAttributes};

    #[test]
    fn builds_fresh_type() -> Result<()> {
        let object = Token::from_parts(TableId::TypeRef, 1);
        let type_def = TypeDefBuilder::new()
            .name("MyClass")
            .namespace("MyNamespace")
            .extends(object)
            .flags(TypeAttributes::PUBLIC | TypeAttributes::BEFORE_FIELD_INIT)
            .build()?;

        assert_eq!(type_def.full_name()?, "MyNamespace.MyClass");
        assert_eq!(type_def.extends(), Some(object));
        assert!(type_def.is_public());
        assert!(type_def.is_before_field_init());
        assert!(type_def.is_dirty());
        Ok(())
    }

    #[test]
    fn global_namespace() -> Result<()> {
        let type_def = TypeDefBuilder::new().name("<Module>").build()?;
        assert_eq!(type_def.namespace()?, "");
        assert_eq!(type_def.full_name()?, "<Module>");
        Ok(())
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            TypeDefBuilder::new().namespace("Lonely").build(),
            Err(Error::ModificationInvalid(_))
        ));
        assert!(matches!(
            TypeDefBuilder::new()
                .name("Broken")
                .extends(Token::from_parts(TableId::Field, 1))
                .build(),
            Err(Error::ModificationInvalid(_))
        ));
    }
}
