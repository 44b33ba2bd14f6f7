//! # Field Builder
//!
//! Fluent construction of fresh [`Field`] entities. A fresh field carries its name and signature
//! as plain values; nothing is interned until the next build pass.
//!
//! ## Usage
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! let mut header = MetadataHeader::new();
//! let owner = header.add_type(TypeDefBuilder::new().name("Counter").build()?)?;
//!
//! let field = FieldBuilder::new()
//!     .name("value")
//!     .flags(FieldAttributes::PRIVATE)
//!     .signature(SignatureField::new(TypeSignature::I4))
//!     .build()?;
//! let token = header.add_field(owner, field)?;
//! assert_eq!(token.row(), 1);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{
    metadata::{signatures::SignatureField, tables::Field},
    Error, Result,
};

/// Builder for [`Field`] entities.
///
/// Name and signature are required; flags default to 0 (compiler controlled instance field).
#[derive(Debug, Clone, Default)]
pub struct FieldBuilder {
    name: Option<String>,
    flags: Option<u32>,
    signature: Option<SignatureField>,
}

impl FieldBuilder {
    /// Creates a new `FieldBuilder` with nothing set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the `FieldAttributes` bitmask
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Sets the field type
    #[must_use]
    pub fn signature(mut self, signature: SignatureField) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Builds the field.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if the name is missing or empty, the
    /// signature is missing, or the flags do not fit the 16-bit column.
    pub fn build(self) -> Result<Field> {
        let name = self
            .name
            .ok_or_else(|| Error::ModificationInvalid("Field name is required".to_string()))?;
        if name.is_empty() {
            return Err(Error::ModificationInvalid(
                "Field name cannot be empty".to_string(),
            ));
        }

        let signature = self.signature.ok_or_else(|| {
            Error::ModificationInvalid("Field signature is required".to_string())
        })?;

        let flags = self.flags.unwrap_or(0);
        if flags > u32::from(u16::MAX) {
            return Err(Error::ModificationInvalid(format!(
                "Field flags {flags:#x} exceed 16 bits"
            )));
        }

        Ok(Field::new(flags, name, signature))
    }
}
