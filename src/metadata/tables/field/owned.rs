use std::{cell::OnceCell, sync::Arc};

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        signatures::{encode_field_signature, parse_field_signature, SignatureField},
        streams::{Heaps, TablesStream},
        tables::{
            BackRef, Constant, CustomAttribute, FieldAttributes, FieldMarshal, FieldRaw, FieldRva,
            LazyValue, MetadataEntity, Resolvable, TableId, TypeDef,
        },
        token::Token,
    },
    utils::{masked_flags, single_flags},
    Error, Result,
};

/// A field definition.
///
/// Name and signature are resolved from the heaps on first access. The type that declares the
/// field and the rows attached to it (default value, marshalling descriptor, initial data,
/// custom attributes) live in other tables; the accessors for them take the [`TablesStream`]
/// to search and remember what they found.
pub struct Field {
    token: Token,
    flags: u32,
    name: LazyValue<String>,
    signature: LazyValue<SignatureField>,
    heaps: Option<Arc<Heaps>>,
    declaring_type: BackRef,
    constant: BackRef,
    field_marshal: BackRef,
    field_rva: BackRef,
    custom_attributes: OnceCell<Vec<Token>>,
    full_name: OnceCell<String>,
    raw: FieldRaw,
    dirty: bool,
}

impl Field {
    /// A fresh field that is not part of any table yet
    pub(crate) fn new(flags: u32, name: String, signature: SignatureField) -> Self {
        Field {
            token: Token::default(),
            flags,
            name: LazyValue::resolved(name),
            signature: LazyValue::resolved(signature),
            heaps: None,
            declaring_type: BackRef::new(),
            constant: BackRef::new(),
            field_marshal: BackRef::new(),
            field_rva: BackRef::new(),
            custom_attributes: OnceCell::new(),
            full_name: OnceCell::new(),
            raw: FieldRaw::default(),
            dirty: true,
        }
    }

    fn heaps(&self) -> Result<&Heaps> {
        self.heaps.as_deref().ok_or(Error::Detached(self.token))
    }

    /// The raw `FieldAttributes` bitmask
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Replace the whole `FieldAttributes` bitmask
    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
        self.dirty = true;
    }

    /// The name of the field.
    ///
    /// # Errors
    /// Returns an error if the name of a parsed field cannot be read from `#Strings`.
    pub fn name(&self) -> Result<&str> {
        self.name
            .get_or_resolve(|offset| Ok(self.heaps()?.strings.get(offset as usize)?.to_string()))
            .map(String::as_str)
    }

    /// Rename the field
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
        self.full_name = OnceCell::new();
        self.dirty = true;
    }

    /// The type of the field.
    ///
    /// # Errors
    /// Returns an error if the signature blob is out of range or malformed.
    pub fn signature(&self) -> Result<&SignatureField> {
        self.signature
            .get_or_resolve(|offset| parse_field_signature(self.heaps()?.blob.get(offset as usize)?))
    }

    /// Change the type of the field
    pub fn set_signature(&mut self, signature: SignatureField) {
        self.signature.set(signature);
        self.full_name = OnceCell::new();
        self.dirty = true;
    }

    /// Run `scan` once for `relation` and cache the result. A field without a row yet has no
    /// relations and caches nothing.
    fn back_reference<F>(&self, relation: &BackRef, scan: F) -> Option<Token>
    where
        F: FnOnce() -> Option<Token>,
    {
        if !self.token.is_assigned() {
            return relation.cached().flatten();
        }
        relation.get_or_scan(scan)
    }

    /// The type whose field list contains this field
    #[must_use]
    pub fn declaring_type<'a>(&self, tables: &'a TablesStream) -> Option<&'a TypeDef> {
        let row = self.token.row();
        let token = self.back_reference(&self.declaring_type, || {
            tables
                .type_defs
                .find_first(|owner| owner.field_range(tables).contains(&row))
                .map(TypeDef::token)
        })?;
        tables.type_defs.get_token(token)
    }

    /// Record `owner` as the declaring type.
    ///
    /// The declaring type is implied by the field lists of the `TypeDef` table; this only
    /// replaces the cached relation.
    pub fn set_declaring_type(&mut self, owner: Option<Token>) {
        self.declaring_type.set(owner);
        self.full_name = OnceCell::new();
    }

    /// The default value of the field
    #[must_use]
    pub fn constant<'a>(&self, tables: &'a TablesStream) -> Option<&'a Constant> {
        let token = self.back_reference(&self.constant, || {
            tables
                .constants
                .find_first(|constant| constant.parent().token == self.token)
                .map(Constant::token)
        })?;
        tables.constants.get_token(token)
    }

    /// Attach (or detach) a default value; toggles `HasDefault`
    pub fn set_constant(&mut self, constant: Option<Token>) {
        self.constant.set(constant);
        self.set_has_default(constant.is_some());
    }

    /// The marshalling descriptor of the field
    #[must_use]
    pub fn field_marshal<'a>(&self, tables: &'a TablesStream) -> Option<&'a FieldMarshal> {
        let token = self.back_reference(&self.field_marshal, || {
            tables
                .field_marshals
                .find_first(|marshal| marshal.parent().token == self.token)
                .map(FieldMarshal::token)
        })?;
        tables.field_marshals.get_token(token)
    }

    /// Attach (or detach) a marshalling descriptor; toggles `HasFieldMarshal`
    pub fn set_field_marshal(&mut self, marshal: Option<Token>) {
        self.field_marshal.set(marshal);
        self.set_has_field_marshal(marshal.is_some());
    }

    /// The initial data of the field. Only searched if `HasFieldRVA` is set.
    #[must_use]
    pub fn field_rva<'a>(&self, tables: &'a TablesStream) -> Option<&'a FieldRva> {
        if !self.has_field_rva() {
            return None;
        }

        let row = self.token.row();
        let token = self.back_reference(&self.field_rva, || {
            tables
                .field_rvas
                .find_first(|rva| rva.field() == row)
                .map(FieldRva::token)
        })?;
        tables.field_rvas.get_token(token)
    }

    /// Attach (or detach) initial data; toggles `HasFieldRVA`
    pub fn set_field_rva(&mut self, rva: Option<Token>) {
        self.field_rva.set(rva);
        self.flags = crate::utils::set_flag(self.flags, FieldAttributes::HAS_FIELD_RVA, rva.is_some());
        self.dirty = true;
    }

    /// The custom attributes applied to this field, in row order
    #[must_use]
    pub fn custom_attributes<'a>(&self, tables: &'a TablesStream) -> Vec<&'a CustomAttribute> {
        if !self.token.is_assigned() {
            return Vec::new();
        }

        self.custom_attributes
            .get_or_init(|| {
                tables
                    .custom_attributes
                    .find_all(|attribute| attribute.parent().token == self.token)
                    .map(CustomAttribute::token)
                    .collect()
            })
            .iter()
            .filter_map(|token| tables.custom_attributes.get_token(*token))
            .collect()
    }

    /// Append to the collection, if it has been created already
    pub(crate) fn push_custom_attribute(&mut self, attribute: Token) {
        if let Some(attributes) = self.custom_attributes.get_mut() {
            attributes.push(attribute);
        }
    }

    /// `"<field type> <declaring type>::<name>"`, or `"<field type> <name>"` for a field
    /// without a declaring type.
    ///
    /// # Errors
    /// Returns an error if the name or signature of the field or the name of its declaring type
    /// cannot be resolved.
    pub fn full_name(&self, tables: &TablesStream) -> Result<&str> {
        if let Some(full_name) = self.full_name.get() {
            return Ok(full_name);
        }

        let field_type = &self.signature()?.base;
        let name = self.name()?;
        let full_name = match self.declaring_type(tables) {
            Some(owner) => format!("{} {}::{}", field_type, owner.full_name()?, name),
            None => format!("{field_type} {name}"),
        };

        Ok(self.full_name.get_or_init(|| full_name))
    }

    masked_flags!(FieldAttributes::FIELD_ACCESS_MASK,
        /// Member not referenceable
        is_compiler_controlled / set_compiler_controlled => FieldAttributes::COMPILER_CONTROLLED,
        /// Accessible only by the parent type
        is_private / set_private => FieldAttributes::PRIVATE,
        /// Accessible by sub-types only in this assembly
        is_family_and_assembly / set_family_and_assembly => FieldAttributes::FAM_AND_ASSEM,
        /// Accessible by anyone in the assembly
        is_assembly / set_assembly => FieldAttributes::ASSEMBLY,
        /// Accessible only by type and sub-types
        is_family / set_family => FieldAttributes::FAMILY,
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        is_family_or_assembly / set_family_or_assembly => FieldAttributes::FAM_OR_ASSEM,
        /// Accessible by anyone who has visibility to this scope
        is_public / set_public => FieldAttributes::PUBLIC,
    );

    single_flags!(
        /// Defined on the type rather than per instance
        is_static / set_static => FieldAttributes::STATIC,
        /// Can only be written during initialization
        is_init_only / set_init_only => FieldAttributes::INIT_ONLY,
        /// Compile time constant
        is_literal / set_literal => FieldAttributes::LITERAL,
        /// Not serialized when the type is remoted
        is_not_serialized / set_not_serialized => FieldAttributes::NOT_SERIALIZED,
        /// Special name
        is_special_name / set_special_name => FieldAttributes::SPECIAL_NAME,
        /// Runtime special name
        is_rt_special_name / set_rt_special_name => FieldAttributes::RTSPECIAL_NAME,
        /// Implementation forwarded through `PInvoke`
        is_pinvoke_impl / set_pinvoke_impl => FieldAttributes::PINVOKE_IMPL,
        /// Has a `FieldMarshal` row
        has_field_marshal / set_has_field_marshal => FieldAttributes::HAS_FIELD_MARSHAL,
        /// Has a `Constant` row
        has_default / set_has_default => FieldAttributes::HAS_DEFAULT,
    );

    /// Has a `FieldRVA` row, see [`Field::set_field_rva`]
    #[must_use]
    pub fn has_field_rva(&self) -> bool {
        self.flags & FieldAttributes::HAS_FIELD_RVA != 0
    }
}

impl MetadataEntity for Field {
    type Raw = FieldRaw;
    const TABLE_ID: TableId = TableId::Field;

    fn from_raw(raw: FieldRaw, context: &ReadingContext) -> Result<Self> {
        context.check_string(raw.name)?;
        context.check_blob(raw.signature)?;

        Ok(Field {
            token: raw.token,
            flags: raw.flags,
            name: LazyValue::unresolved(raw.name),
            signature: LazyValue::unresolved(raw.signature),
            heaps: Some(context.heaps().clone()),
            declaring_type: BackRef::new(),
            constant: BackRef::new(),
            field_marshal: BackRef::new(),
            field_rva: BackRef::new(),
            custom_attributes: OnceCell::new(),
            full_name: OnceCell::new(),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let name = match context.reusable(self.name.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_string(self.name()?)?,
        };
        let signature = match context.reusable(self.signature.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_blob(&encode_field_signature(self.signature()?)?)?,
        };

        self.raw = FieldRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            flags: self.flags,
            name,
            signature,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &FieldRaw {
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
        self.name()?;
        self.signature()?;
        Ok(())
    }
}

impl Resolvable for Field {
    type Definition = Field;

    fn resolve(&self) -> Option<&Field> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            config::BuildConfig,
            signatures::TypeSignature,
            tables::{ConstantValue, MetadataTable},
        },
        test::factories::{heaps, reading_context, widget_header},
    };

    fn parsed_field() -> (Arc<Heaps>, Field) {
        let heaps = heaps(b"\0count\0", &[0x00, 0x02, 0x06, 0x08]);
        let context = reading_context(heaps.clone(), &[(TableId::Field, 1)]);
        let raw = FieldRaw {
            rid: 1,
            token: Token::from_parts(TableId::Field, 1),
            offset: 0,
            flags: FieldAttributes::PUBLIC | FieldAttributes::STATIC,
            name: 1,
            signature: 1,
        };
        (heaps.clone(), Field::from_raw(raw, &context).unwrap())
    }

    #[test]
    fn name_resolves_once() {
        let (heaps, field) = parsed_field();
        assert!(!field.name.is_resolved());
        assert_eq!(heaps.strings.lookups(), 0);

        for _ in 0..3 {
            assert_eq!(field.name().unwrap(), "count");
        }
        assert_eq!(heaps.strings.lookups(), 1);
        assert_eq!(field.signature().unwrap().base, TypeSignature::I4);
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let heaps = heaps(b"\0count\0", &[0x00]);
        let context = reading_context(heaps, &[(TableId::Field, 1)]);
        let raw = FieldRaw {
            rid: 1,
            token: Token::from_parts(TableId::Field, 1),
            name: 0x40,
            ..FieldRaw::default()
        };
        assert!(matches!(
            Field::from_raw(raw, &context),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn fresh_field_needs_no_heaps() {
        let field = Field::new(
            FieldAttributes::PRIVATE,
            "value".to_string(),
            SignatureField::new(TypeSignature::String),
        );
        assert_eq!(field.name().unwrap(), "value");
        assert!(field.is_private());
        assert!(field.is_dirty());
        assert!(!field.token().is_assigned());
    }

    #[test]
    fn access_levels_are_exclusive() {
        let (_, mut field) = parsed_field();
        assert!(field.is_public());

        field.set_private(true);
        assert!(field.is_private());
        assert!(!field.is_public());
        assert!(field.is_static());
        assert_eq!(field.flags() & FieldAttributes::FIELD_ACCESS_MASK, FieldAttributes::PRIVATE);

        field.set_static(false);
        assert!(!field.is_static());
        assert!(field.is_private());
    }

    #[test]
    fn mutation_marks_dirty() {
        let (heaps, mut field) = parsed_field();
        assert!(!field.is_dirty());

        field.set_name("total");
        assert!(field.is_dirty());
        let info = reading_context(heaps.clone(), &[]).info().clone();
        let result = MetadataTable::<Field>::write_member(&field, &mut [0u8; 6], &mut 0, &info);
        assert!(matches!(result, Err(Error::StaleRow(token)) if token == field.token()));

        let mut context = BuildingContext::new(heaps, BuildConfig::default());
        field.update_raw(&mut context).unwrap();
        assert!(!field.is_dirty());
        // "total" is appended after the seeded "\0count\0"
        assert_eq!(field.raw().name, 7);
        // the signature was never touched and keeps its offset
        assert_eq!(field.raw().signature, 1);
    }

    #[test]
    fn back_references() {
        let header = widget_header();
        let tables = header.tables();

        let count = tables.fields.get(1).unwrap();
        let label = tables.fields.get(2).unwrap();

        assert_eq!(count.declaring_type(tables).unwrap().name().unwrap(), "Widget");
        assert_eq!(
            count.constant(tables).unwrap().value().unwrap(),
            &ConstantValue::I4(42)
        );
        assert!(label.constant(tables).is_none());
        assert!(label.field_rva(tables).is_none());
        assert_eq!(count.custom_attributes(tables).len(), 1);
        assert!(label.custom_attributes(tables).is_empty());

        assert_eq!(
            count.full_name(tables).unwrap(),
            "System.Int32 Sample.Widget::count"
        );
        assert_eq!(
            label.full_name(tables).unwrap(),
            "System.String Sample.Widget::label"
        );
        assert_eq!(count.resolve().unwrap().token(), count.token());
    }

    #[test]
    fn absent_relation_stays_cached() {
        let mut header = widget_header();
        let label = Token::from_parts(TableId::Field, 2);

        assert!(header.tables().fields.get_token(label).unwrap().constant(header.tables()).is_none());

        // a row appended behind the field's back is not seen
        let constant = crate::metadata::tables::ConstantBuilder::new()
            .parent(label)
            .value(ConstantValue::String("none".to_string()))
            .build()
            .unwrap();
        header.tables_mut().constants.push(constant).unwrap();
        let tables = header.tables();
        assert!(tables.fields.get_token(label).unwrap().constant(tables).is_none());

        // explicit reassignment refreshes it
        let token = Token::from_parts(TableId::Constant, 2);
        header
            .tables_mut()
            .fields
            .get_token_mut(label)
            .unwrap()
            .set_constant(Some(token));
        let tables = header.tables();
        let field = tables.fields.get_token(label).unwrap();
        assert_eq!(field.constant(tables).unwrap().token(), token);
        assert!(field.has_default());
    }

    #[test]
    fn renaming_invalidates_full_name() {
        let mut header = widget_header();
        let token = Token::from_parts(TableId::Field, 2);
        {
            let tables = header.tables();
            let label = tables.fields.get_token(token).unwrap();
            assert_eq!(label.full_name(tables).unwrap(), "System.String Sample.Widget::label");
        }

        header.tables_mut().fields.get_token_mut(token).unwrap().set_name("caption");
        let tables = header.tables();
        assert_eq!(
            tables.fields.get_token(token).unwrap().full_name(tables).unwrap(),
            "System.String Sample.Widget::caption"
        );
    }
}
