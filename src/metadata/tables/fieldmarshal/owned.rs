use std::sync::Arc;

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        streams::Heaps,
        tables::{
            coded_parent, CodedIndex, CodedIndexType, FieldMarshalRaw, LazyValue, MetadataEntity,
            TableId,
        },
        token::Token,
    },
    Error, Result,
};

/// The marshalling descriptor of a field or parameter.
pub struct FieldMarshal {
    token: Token,
    parent: CodedIndex,
    native_type: LazyValue<Vec<u8>>,
    heaps: Option<Arc<Heaps>>,
    raw: FieldMarshalRaw,
    dirty: bool,
}

impl FieldMarshal {
    pub(crate) fn new(parent: CodedIndex, native_type: Vec<u8>) -> Self {
        FieldMarshal {
            token: Token::default(),
            parent,
            native_type: LazyValue::resolved(native_type),
            heaps: None,
            raw: FieldMarshalRaw::default(),
            dirty: true,
        }
    }

    /// The field or parameter being marshalled
    #[must_use]
    pub fn parent(&self) -> &CodedIndex {
        &self.parent
    }

    /// Move the descriptor to another owner.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] unless `parent` is a `Field` or `Param`
    /// token.
    pub fn set_parent(&mut self, parent: Token) -> Result<()> {
        self.parent = coded_parent(parent, CodedIndexType::HasFieldMarshal)?;
        self.dirty = true;
        Ok(())
    }

    /// The `MarshalSpec` blob (II.23.4).
    ///
    /// # Errors
    /// Returns an error if the blob cannot be read.
    pub fn native_type(&self) -> Result<&[u8]> {
        self.native_type
            .get_or_resolve(|offset| {
                let heaps = self.heaps.as_deref().ok_or(Error::Detached(self.token))?;
                Ok(heaps.blob.get(offset as usize)?.to_vec())
            })
            .map(Vec::as_slice)
    }

    /// Replace the `MarshalSpec` blob
    pub fn set_native_type(&mut self, native_type: Vec<u8>) {
        self.native_type.set(native_type);
        self.dirty = true;
    }
}

impl MetadataEntity for FieldMarshal {
    type Raw = FieldMarshalRaw;
    const TABLE_ID: TableId = TableId::FieldMarshal;

    fn from_raw(raw: FieldMarshalRaw, context: &ReadingContext) -> Result<Self> {
        context.check_coded(&raw.parent)?;
        context.check_blob(raw.native_type)?;

        Ok(FieldMarshal {
            token: raw.token,
            parent: raw.parent,
            native_type: LazyValue::unresolved(raw.native_type),
            heaps: Some(context.heaps().clone()),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let native_type = match context.reusable(self.native_type.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_blob(self.native_type()?)?,
        };

        self.raw = FieldMarshalRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            parent: self.parent,
            native_type,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &FieldMarshalRaw {
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
        self.native_type().map(|_| ())
    }
}
