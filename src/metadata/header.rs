//! The in-memory metadata of one image.
//!
//! A [`MetadataHeader`] owns the tables stream of an image together with the heaps its parsed
//! entities resolve against. It is either parsed from existing streams
//! ([`MetadataHeader::from_streams`]) or started empty ([`MetadataHeader::new`]), mutated through
//! [`MetadataHeader::tables_mut`] and the `add_*` / `attach_*` helpers, and serialized again with
//! [`MetadataHeader::build`] followed by [`crate::metadata::build::UpdatedMetadata::write`].
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! let mut header = MetadataHeader::new();
//! let holder = header.add_type(TypeDefBuilder::new().name("Holder").build()?)?;
//! let answer = header.add_field(
//!     holder,
//!     FieldBuilder::new()
//!         .name("Answer")
//!         .flags(FieldAttributes::PUBLIC | FieldAttributes::STATIC | FieldAttributes::LITERAL)
//!         .signature(SignatureField::new(TypeSignature::I4))
//!         .build()?,
//! )?;
//! header.attach_constant(answer, ConstantValue::I4(42))?;
//!
//! let streams = header.build()?.write()?;
//! let reloaded = MetadataHeader::from_streams(&streams, LoadConfig::default())?;
//! let field = reloaded.tables().fields.get(1).unwrap();
//! assert!(field.has_default());
//! # Ok::<(), cilmeta::Error>(())
//! ```

use std::sync::Arc;

use log::debug;

use crate::{
    metadata::{
        build::UpdatedMetadata,
        config::{BuildConfig, LoadConfig},
        streams::{Heaps, MetadataStreams, TablesStream},
        tables::{
            coded_parent, CodedIndexType, Constant, ConstantValue, CustomAttribute, Field,
            FieldMarshal, FieldRva, MetadataEntity, MetadataTable, Module, TableAccess, TableId,
            TableInfoRef, TypeDef,
        },
        token::Token,
    },
    Error, Result,
};

/// Where a [`MetadataHeader`] stands between loading and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Created empty, never written
    Fresh,
    /// Loaded from streams and not changed since
    Parsed,
    /// Tables were handed out for mutation since the last load or build
    Mutated,
    /// Every raw row was recomputed, the layout of the next write is fixed
    Updated,
    /// The streams of the last build were produced
    Written,
}

/// The tables and heaps of one image.
pub struct MetadataHeader {
    tables: TablesStream,
    heaps: Arc<Heaps>,
    source_info: Option<TableInfoRef>,
    load_config: LoadConfig,
    build_config: BuildConfig,
    phase: BuildPhase,
}

impl Default for MetadataHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataHeader {
    /// An image without any rows
    #[must_use]
    pub fn new() -> Self {
        MetadataHeader {
            tables: TablesStream::new(),
            heaps: Arc::new(Heaps::empty()),
            source_info: None,
            load_config: LoadConfig::default(),
            build_config: BuildConfig::default(),
            phase: BuildPhase::Fresh,
        }
    }

    /// Load the tables stream and heaps of an image.
    ///
    /// Heap-backed values stay unresolved unless `config` asks for eager resolution.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if the tables stream is missing, or any error of
    /// [`TablesStream::read`] and of the heap parsers.
    pub fn from_streams(streams: &MetadataStreams, config: LoadConfig) -> Result<Self> {
        if streams.tables.is_empty() {
            return Err(Error::Empty);
        }

        let heaps = Arc::new(Heaps::from_streams(streams)?);
        debug!(
            "loading metadata: #~ {} bytes, #Strings {}, #Blob {}, #GUID {}, #US {}",
            streams.tables.len(),
            heaps.strings.len(),
            heaps.blob.len(),
            heaps.guid.len(),
            heaps.user_strings.len()
        );

        let (tables, info) = TablesStream::read(&streams.tables, &heaps, config)?;
        Ok(MetadataHeader {
            tables,
            heaps,
            source_info: Some(info),
            load_config: config,
            build_config: BuildConfig::default(),
            phase: BuildPhase::Parsed,
        })
    }

    /// Use `config` for the next builds
    #[must_use]
    pub fn with_build_config(mut self, config: BuildConfig) -> Self {
        self.build_config = config;
        self
    }

    /// The options the image was loaded with
    #[must_use]
    pub fn load_config(&self) -> &LoadConfig {
        &self.load_config
    }

    /// The options of the next build
    #[must_use]
    pub fn build_config(&self) -> &BuildConfig {
        &self.build_config
    }

    /// The tables stream
    #[must_use]
    pub fn tables(&self) -> &TablesStream {
        &self.tables
    }

    /// The tables stream, for mutation
    pub fn tables_mut(&mut self) -> &mut TablesStream {
        self.phase = BuildPhase::Mutated;
        &mut self.tables
    }

    /// The table holding entities of type `T`
    #[must_use]
    pub fn table<T: MetadataEntity>(&self) -> &MetadataTable<T>
    where
        TablesStream: TableAccess<T>,
    {
        self.tables.table()
    }

    /// The table holding entities of type `T`, for mutation
    pub fn table_mut<T: MetadataEntity>(&mut self) -> &mut MetadataTable<T>
    where
        TablesStream: TableAccess<T>,
    {
        self.tables_mut().table_mut()
    }

    /// The heaps parsed entities resolve against. Empty for a fresh image.
    #[must_use]
    pub fn heaps(&self) -> &Arc<Heaps> {
        &self.heaps
    }

    /// The layout the image was loaded with, `None` for a fresh image
    #[must_use]
    pub fn source_info(&self) -> Option<&TableInfoRef> {
        self.source_info.as_ref()
    }

    /// The current phase
    #[must_use]
    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: BuildPhase) {
        self.phase = phase;
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut TablesStream, &Arc<Heaps>) {
        (&mut self.tables, &self.heaps)
    }

    /// Recompute every raw row and fix the layout of the next write.
    ///
    /// The returned handle borrows the header, so nothing can change between the update and
    /// the write.
    ///
    /// # Errors
    /// Returns the first update error, e.g. an unresolvable heap value or a value that does not
    /// fit its column.
    pub fn build(&mut self) -> Result<UpdatedMetadata<'_>> {
        UpdatedMetadata::new(self)
    }

    /// Add the `Module` row of a fresh image.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if the image already has a module.
    pub fn add_module(&mut self, name: impl Into<String>, mvid: uguid::Guid) -> Result<Token> {
        if !self.tables.module.is_empty() {
            return Err(Error::ModificationInvalid(
                "The image already has a Module row".to_string(),
            ));
        }

        self.tables_mut()
            .module
            .push(Module::new(name.into(), mvid))
    }

    /// Append a type. Its field list starts after the last existing field.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if the `TypeDef` table is full.
    pub fn add_type(&mut self, mut type_def: TypeDef) -> Result<Token> {
        let tables = self.tables_mut();
        type_def.set_field_list(tables.fields.row_count() + 1);
        tables.type_defs.push(type_def)
    }

    /// Append `field` to the field list of `owner`.
    ///
    /// Field lists are contiguous runs, so only the last type of the `TypeDef` table can grow.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if `owner` is not the last type.
    pub fn add_field(&mut self, owner: Token, mut field: Field) -> Result<Token> {
        let last = self.tables.type_defs.row_count();
        if owner.table_id() != Some(TableId::TypeDef) || owner.row() == 0 || owner.row() != last {
            return Err(Error::ModificationInvalid(format!(
                "Fields can only be added to the last type ({} rows), not {owner}",
                last
            )));
        }

        let tables = self.tables_mut();
        let next = tables.fields.row_count() + 1;
        if let Some(type_def) = tables.type_defs.get_token_mut(owner) {
            if type_def.field_list() == 0 || type_def.field_list() > next {
                type_def.set_field_list(next);
            }
        }

        field.set_declaring_type(Some(owner));
        tables.fields.push(field)
    }

    /// Give `field` a default value; sets `HasDefault`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if `field` does not exist.
    pub fn attach_constant(&mut self, field: Token, value: ConstantValue) -> Result<Token> {
        let parent = coded_parent(field, CodedIndexType::HasConstant)?;
        let tables = self.tables_mut();
        if tables.fields.get_token(field).is_none() {
            return Err(Error::TokenNotFound(field));
        }

        let token = tables.constants.push(Constant::new(parent, value))?;
        if let Some(owner) = tables.fields.get_token_mut(field) {
            owner.set_constant(Some(token));
        }
        Ok(token)
    }

    /// Give `field` a marshalling descriptor; sets `HasFieldMarshal`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if `field` does not exist.
    pub fn attach_field_marshal(&mut self, field: Token, native_type: Vec<u8>) -> Result<Token> {
        let parent = coded_parent(field, CodedIndexType::HasFieldMarshal)?;
        let tables = self.tables_mut();
        if tables.fields.get_token(field).is_none() {
            return Err(Error::TokenNotFound(field));
        }

        let token = tables
            .field_marshals
            .push(FieldMarshal::new(parent, native_type))?;
        if let Some(owner) = tables.fields.get_token_mut(field) {
            owner.set_field_marshal(Some(token));
        }
        Ok(token)
    }

    /// Give `field` initial data at `rva`; sets `HasFieldRVA`.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if `field` does not exist.
    pub fn attach_field_rva(&mut self, field: Token, rva: u32) -> Result<Token> {
        let tables = self.tables_mut();
        if tables.fields.get_token(field).is_none() {
            return Err(Error::TokenNotFound(field));
        }

        let token = tables.field_rvas.push(FieldRva::new(rva, field.row()))?;
        if let Some(owner) = tables.fields.get_token_mut(field) {
            owner.set_field_rva(Some(token));
        }
        Ok(token)
    }

    /// Apply a custom attribute to `parent`.
    ///
    /// `constructor` is a `MethodDef` or `MemberRef` token; those tables are not modelled, so
    /// only its kind is checked. A `Field` or `TypeDef` parent must exist and sees the new row
    /// in its attribute collection right away.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if either token has the wrong kind, or
    /// [`crate::Error::TokenNotFound`] if a modelled parent does not exist.
    pub fn attach_custom_attribute(
        &mut self,
        parent: Token,
        constructor: Token,
        value: Vec<u8>,
    ) -> Result<Token> {
        let parent_index = coded_parent(parent, CodedIndexType::HasCustomAttribute)?;
        let constructor_index = coded_parent(constructor, CodedIndexType::CustomAttributeType)?;

        let tables = self.tables_mut();
        let exists = match parent.table_id() {
            Some(TableId::Field) => tables.fields.get_token(parent).is_some(),
            Some(TableId::TypeDef) => tables.type_defs.get_token(parent).is_some(),
            Some(TableId::Module) => tables.module.get_token(parent).is_some(),
            _ => true,
        };
        if !exists {
            return Err(Error::TokenNotFound(parent));
        }

        let token = tables.custom_attributes.push(CustomAttribute::new(
            parent_index,
            constructor_index,
            value,
        ))?;
        if let Some(field) = tables.fields.get_token_mut(parent) {
            field.push_custom_attribute(token);
        } else if let Some(type_def) = tables.type_defs.get_token_mut(parent) {
            type_def.push_custom_attribute(token);
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            signatures::{SignatureField, TypeSignature},
            tables::{FieldAttributes, FieldBuilder, TypeDefBuilder},
        },
        test::factories::widget_header,
    };

    fn int_field(name: &str) -> Field {
        FieldBuilder::new()
            .name(name)
            .signature(SignatureField::new(TypeSignature::I4))
            .build()
            .unwrap()
    }

    #[test]
    fn phases() {
        let mut header = MetadataHeader::new();
        assert_eq!(header.phase(), BuildPhase::Fresh);

        header.add_type(TypeDefBuilder::new().name("A").build().unwrap()).unwrap();
        assert_eq!(header.phase(), BuildPhase::Mutated);

        let updated = header.build().unwrap();
        let streams = updated.write().unwrap();
        assert_eq!(header.phase(), BuildPhase::Written);

        let parsed = MetadataHeader::from_streams(&streams, LoadConfig::default()).unwrap();
        assert_eq!(parsed.phase(), BuildPhase::Parsed);
        assert!(parsed.source_info().is_some());
    }

    #[test]
    fn empty_tables_stream() {
        let result = MetadataHeader::from_streams(&MetadataStreams::default(), LoadConfig::default());
        assert!(matches!(result, Err(Error::Empty)));
    }

    #[test]
    fn field_lists() {
        let mut header = MetadataHeader::new();
        let first = header.add_type(TypeDefBuilder::new().name("First").build().unwrap()).unwrap();
        header.add_field(first, int_field("a")).unwrap();
        header.add_field(first, int_field("b")).unwrap();
        let second = header.add_type(TypeDefBuilder::new().name("Second").build().unwrap()).unwrap();
        header.add_field(second, int_field("c")).unwrap();

        let tables = header.tables();
        assert_eq!(tables.type_defs.get_token(first).unwrap().field_range(tables), 1..3);
        assert_eq!(tables.type_defs.get_token(second).unwrap().field_range(tables), 3..4);
        let c = tables.fields.get(3).unwrap();
        assert_eq!(c.declaring_type(tables).unwrap().token(), second);

        // First is closed now
        assert!(matches!(
            header.add_field(first, int_field("late")),
            Err(Error::ModificationInvalid(_))
        ));
        assert!(matches!(
            header.add_field(Token::from_parts(TableId::Field, 1), int_field("x")),
            Err(Error::ModificationInvalid(_))
        ));
    }

    #[test]
    fn type_without_fields() {
        let mut header = MetadataHeader::new();
        let empty = header.add_type(TypeDefBuilder::new().name("Empty").build().unwrap()).unwrap();
        let full = header.add_type(TypeDefBuilder::new().name("Full").build().unwrap()).unwrap();
        header.add_field(full, int_field("x")).unwrap();

        let tables = header.tables();
        assert!(tables.type_defs.get_token(empty).unwrap().field_range(tables).is_empty());
        assert_eq!(tables.type_defs.get_token(full).unwrap().fields(tables).count(), 1);
    }

    #[test]
    fn attachments_set_flags() {
        let mut header = MetadataHeader::new();
        let owner = header.add_type(TypeDefBuilder::new().name("Native").build().unwrap()).unwrap();
        let field = header.add_field(owner, int_field("buffer")).unwrap();

        header.attach_field_marshal(field, vec![0x14]).unwrap();
        let rva = header.attach_field_rva(field, 0x2050).unwrap();

        let tables = header.tables();
        let buffer = tables.fields.get_token(field).unwrap();
        assert!(buffer.has_field_marshal());
        assert!(buffer.has_field_rva());
        assert_eq!(buffer.field_marshal(tables).unwrap().native_type().unwrap(), &[0x14]);
        assert_eq!(buffer.field_rva(tables).unwrap().token(), rva);
        assert_eq!(buffer.field_rva(tables).unwrap().rva(), 0x2050);
        assert_eq!(buffer.flags() & FieldAttributes::HAS_FIELD_RVA, FieldAttributes::HAS_FIELD_RVA);
    }

    #[test]
    fn attachment_targets() {
        let mut header = widget_header();
        let missing = Token::from_parts(TableId::Field, 9);

        assert!(matches!(
            header.attach_constant(missing, ConstantValue::Null),
            Err(Error::TokenNotFound(_))
        ));
        assert!(matches!(
            header.attach_constant(Token::from_parts(TableId::TypeDef, 1), ConstantValue::Null),
            Err(Error::ModificationInvalid(_))
        ));
        assert!(matches!(
            header.attach_custom_attribute(
                Token::from_parts(TableId::TypeDef, 2),
                Token::from_parts(TableId::Field, 1),
                vec![0x01, 0x00, 0x00, 0x00],
            ),
            Err(Error::ModificationInvalid(_))
        ));
    }

    #[test]
    fn attribute_collection_sees_new_rows() {
        let mut header = widget_header();
        let widget = Token::from_parts(TableId::TypeDef, 2);
        assert!(header
            .tables()
            .type_defs
            .get_token(widget)
            .unwrap()
            .custom_attributes(header.tables())
            .is_empty());

        let attribute = header
            .attach_custom_attribute(
                widget,
                Token::from_parts(TableId::MemberRef, 3),
                vec![0x01, 0x00, 0x00, 0x00],
            )
            .unwrap();

        let tables = header.tables();
        let attributes = tables.type_defs.get_token(widget).unwrap().custom_attributes(tables);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].token(), attribute);
    }

    #[test]
    fn single_module() {
        let mut header = MetadataHeader::new();
        header.add_module("one.dll", uguid::guid!("00000000-0000-0000-0000-000000000001")).unwrap();
        assert!(matches!(
            header.add_module("two.dll", uguid::Guid::ZERO),
            Err(Error::ModificationInvalid(_))
        ));
    }

    #[test]
    fn typed_table_access() {
        let header = widget_header();
        assert_eq!(header.table::<Field>().len(), 2);
        assert_eq!(header.table::<TypeDef>().len(), 2);
        assert_eq!(header.table::<Constant>().len(), 1);
    }
}
