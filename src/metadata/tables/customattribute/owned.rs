use std::sync::Arc;

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        streams::Heaps,
        tables::{
            coded_parent, CodedIndex, CodedIndexType, CustomAttributeRaw, LazyValue,
            MetadataEntity, TableId,
        },
        token::Token,
    },
    Error, Result,
};

/// One custom attribute instance.
pub struct CustomAttribute {
    token: Token,
    parent: CodedIndex,
    constructor: CodedIndex,
    value: LazyValue<Vec<u8>>,
    heaps: Option<Arc<Heaps>>,
    raw: CustomAttributeRaw,
    dirty: bool,
}

impl CustomAttribute {
    pub(crate) fn new(parent: CodedIndex, constructor: CodedIndex, value: Vec<u8>) -> Self {
        CustomAttribute {
            token: Token::default(),
            parent,
            constructor,
            value: LazyValue::resolved(value),
            heaps: None,
            raw: CustomAttributeRaw::default(),
            dirty: true,
        }
    }

    /// The row the attribute is applied to
    #[must_use]
    pub fn parent(&self) -> &CodedIndex {
        &self.parent
    }

    /// Apply the attribute to another row.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if `parent` cannot carry attributes.
    pub fn set_parent(&mut self, parent: Token) -> Result<()> {
        self.parent = coded_parent(parent, CodedIndexType::HasCustomAttribute)?;
        self.dirty = true;
        Ok(())
    }

    /// The attribute constructor, a `MethodDef` or `MemberRef`
    #[must_use]
    pub fn constructor(&self) -> &CodedIndex {
        &self.constructor
    }

    /// The argument blob (II.23.3), undecoded.
    ///
    /// # Errors
    /// Returns an error if the blob cannot be read.
    pub fn value(&self) -> Result<&[u8]> {
        self.value
            .get_or_resolve(|offset| {
                let heaps = self.heaps.as_deref().ok_or(Error::Detached(self.token))?;
                Ok(heaps.blob.get(offset as usize)?.to_vec())
            })
            .map(Vec::as_slice)
    }

    /// Replace the argument blob
    pub fn set_value(&mut self, value: Vec<u8>) {
        self.value.set(value);
        self.dirty = true;
    }
}

impl MetadataEntity for CustomAttribute {
    type Raw = CustomAttributeRaw;
    const TABLE_ID: TableId = TableId::CustomAttribute;

    fn from_raw(raw: CustomAttributeRaw, context: &ReadingContext) -> Result<Self> {
        context.check_coded(&raw.parent)?;
        context.check_coded(&raw.constructor)?;
        context.check_blob(raw.value)?;

        Ok(CustomAttribute {
            token: raw.token,
            parent: raw.parent,
            constructor: raw.constructor,
            value: LazyValue::unresolved(raw.value),
            heaps: Some(context.heaps().clone()),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let value = match context.reusable(self.value.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_blob(self.value()?)?,
        };

        self.raw = CustomAttributeRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            parent: self.parent,
            constructor: self.constructor,
            value,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &CustomAttributeRaw {
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
