use std::{cell::OnceCell, ops::Range, sync::Arc};

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        streams::{Heaps, TablesStream},
        tables::{
            CodedIndex, CodedIndexType, CustomAttribute, Field, LazyValue, MetadataEntity,
            Resolvable, TableId, TypeAttributes, TypeDefRaw,
        },
        token::Token,
    },
    utils::{masked_flags, single_flags},
    Error, Result,
};

/// A type definition.
pub struct TypeDef {
    token: Token,
    flags: u32,
    name: LazyValue<String>,
    namespace: LazyValue<String>,
    extends: CodedIndex,
    field_list: u32,
    method_list: u32,
    heaps: Option<Arc<Heaps>>,
    custom_attributes: OnceCell<Vec<Token>>,
    full_name: OnceCell<String>,
    raw: TypeDefRaw,
    dirty: bool,
}

impl TypeDef {
    /// A fresh type that is not part of any table yet and owns no members
    pub(crate) fn new(flags: u32, name: String, namespace: String, extends: CodedIndex) -> Self {
        TypeDef {
            token: Token::default(),
            flags,
            name: LazyValue::resolved(name),
            namespace: LazyValue::resolved(namespace),
            extends,
            field_list: 0,
            method_list: 1,
            heaps: None,
            custom_attributes: OnceCell::new(),
            full_name: OnceCell::new(),
            raw: TypeDefRaw::default(),
            dirty: true,
        }
    }

    fn heaps(&self) -> Result<&Heaps> {
        self.heaps.as_deref().ok_or(Error::Detached(self.token))
    }

    /// The raw `TypeAttributes` bitmask
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Replace the whole `TypeAttributes` bitmask
    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
        self.dirty = true;
    }

    /// The simple name of the type.
    ///
    /// # Errors
    /// Returns an error if the name cannot be read from `#Strings`.
    pub fn name(&self) -> Result<&str> {
        self.name
            .get_or_resolve(|offset| Ok(self.heaps()?.strings.get(offset as usize)?.to_string()))
            .map(String::as_str)
    }

    /// Rename the type
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
        self.full_name = OnceCell::new();
        self.dirty = true;
    }

    /// The namespace of the type, empty for the global namespace.
    ///
    /// # Errors
    /// Returns an error if the namespace cannot be read from `#Strings`.
    pub fn namespace(&self) -> Result<&str> {
        self.namespace
            .get_or_resolve(|offset| Ok(self.heaps()?.strings.get(offset as usize)?.to_string()))
            .map(String::as_str)
    }

    /// Move the type to another namespace
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace.set(namespace.into());
        self.full_name = OnceCell::new();
        self.dirty = true;
    }

    /// `namespace.name`, or just `name` in the global namespace.
    ///
    /// # Errors
    /// Returns an error if name or namespace cannot be resolved.
    pub fn full_name(&self) -> Result<&str> {
        if let Some(full_name) = self.full_name.get() {
            return Ok(full_name);
        }

        let namespace = self.namespace()?;
        let full_name = if namespace.is_empty() {
            self.name()?.to_string()
        } else {
            format!("{}.{}", namespace, self.name()?)
        };

        Ok(self.full_name.get_or_init(|| full_name))
    }

    /// The base type, `None` for interfaces and `System.Object`
    #[must_use]
    pub fn extends(&self) -> Option<Token> {
        if self.extends.row == 0 {
            None
        } else {
            Some(self.extends.token)
        }
    }

    /// Change the base type.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if `base` is not a `TypeDef`, `TypeRef` or
    /// `TypeSpec` token.
    pub fn set_extends(&mut self, base: Option<Token>) -> Result<()> {
        self.extends = extends_index(base)?;
        self.dirty = true;
        Ok(())
    }

    /// First row of the run of fields this type owns
    #[must_use]
    pub fn field_list(&self) -> u32 {
        self.field_list
    }

    /// Move the start of the field run
    pub fn set_field_list(&mut self, field_list: u32) {
        self.field_list = field_list;
        self.dirty = true;
    }

    /// First row of the run of methods this type owns
    #[must_use]
    pub fn method_list(&self) -> u32 {
        self.method_list
    }

    /// Rows of the `Field` table owned by this type
    #[must_use]
    pub fn field_range(&self, tables: &TablesStream) -> Range<u32> {
        let limit = tables.fields.row_count() + 1;
        let start = self.field_list.min(limit);
        if start == 0 || !self.token.is_assigned() {
            return start..start;
        }

        let end = tables
            .type_defs
            .get(self.token.row() + 1)
            .map_or(limit, TypeDef::field_list);
        start..end.min(limit).max(start)
    }

    /// The fields owned by this type, in row order
    pub fn fields<'a>(&self, tables: &'a TablesStream) -> impl Iterator<Item = &'a Field> + 'a {
        let range = self.field_range(tables);
        range.filter_map(|row| tables.fields.get(row))
    }

    /// The custom attributes applied to this type, in row order
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

    pub(crate) fn push_custom_attribute(&mut self, attribute: Token) {
        if let Some(attributes) = self.custom_attributes.get_mut() {
            attributes.push(attribute);
        }
    }

    masked_flags!(TypeAttributes::VISIBILITY_MASK,
        /// Not visible outside the assembly
        is_not_public / set_not_public => TypeAttributes::NOT_PUBLIC,
        /// Visible outside the assembly
        is_public / set_public => TypeAttributes::PUBLIC,
        /// Nested, public
        is_nested_public / set_nested_public => TypeAttributes::NESTED_PUBLIC,
        /// Nested, private
        is_nested_private / set_nested_private => TypeAttributes::NESTED_PRIVATE,
        /// Nested, family
        is_nested_family / set_nested_family => TypeAttributes::NESTED_FAMILY,
        /// Nested, assembly
        is_nested_assembly / set_nested_assembly => TypeAttributes::NESTED_ASSEMBLY,
        /// Nested, family and assembly
        is_nested_family_and_assembly / set_nested_family_and_assembly => TypeAttributes::NESTED_FAM_AND_ASSEM,
        /// Nested, family or assembly
        is_nested_family_or_assembly / set_nested_family_or_assembly => TypeAttributes::NESTED_FAM_OR_ASSEM,
    );

    masked_flags!(TypeAttributes::LAYOUT_MASK,
        /// Runtime chooses the layout
        is_auto_layout / set_auto_layout => TypeAttributes::AUTO_LAYOUT,
        /// Declaration order
        is_sequential_layout / set_sequential_layout => TypeAttributes::SEQUENTIAL_LAYOUT,
        /// Explicit offsets
        is_explicit_layout / set_explicit_layout => TypeAttributes::EXPLICIT_LAYOUT,
    );

    single_flags!(
        /// Interface rather than class
        is_interface / set_interface => TypeAttributes::INTERFACE,
        /// Abstract
        is_abstract / set_abstract => TypeAttributes::ABSTRACT,
        /// Sealed
        is_sealed / set_sealed => TypeAttributes::SEALED,
        /// Special name
        is_special_name / set_special_name => TypeAttributes::SPECIAL_NAME,
        /// Runtime special name
        is_rt_special_name / set_rt_special_name => TypeAttributes::RTSPECIAL_NAME,
        /// Imported
        is_import / set_import => TypeAttributes::IMPORT,
        /// Serializable
        is_serializable / set_serializable => TypeAttributes::SERIALIZABLE,
        /// Static constructor may run early
        is_before_field_init / set_before_field_init => TypeAttributes::BEFORE_FIELD_INIT,
    );
}

/// The `extends` column for `base`
pub(crate) fn extends_index(base: Option<Token>) -> Result<CodedIndex> {
    let Some(base) = base else {
        return Ok(CodedIndex::new(TableId::TypeDef, 0));
    };

    match base.table_id() {
        Some(table) if CodedIndexType::TypeDefOrRef.tag_of(table).is_some() && base.is_assigned() => {
            Ok(CodedIndex::new(table, base.row()))
        }
        _ => Err(Error::ModificationInvalid(format!(
            "{base} cannot be the base type of a TypeDef"
        ))),
    }
}

impl MetadataEntity for TypeDef {
    type Raw = TypeDefRaw;
    const TABLE_ID: TableId = TableId::TypeDef;

    fn from_raw(raw: TypeDefRaw, context: &ReadingContext) -> Result<Self> {
        context.check_string(raw.type_name)?;
        context.check_string(raw.type_namespace)?;
        context.check_coded(&raw.extends)?;
        context.check_list(TableId::Field, raw.field_list)?;

        Ok(TypeDef {
            token: raw.token,
            flags: raw.flags,
            name: LazyValue::unresolved(raw.type_name),
            namespace: LazyValue::unresolved(raw.type_namespace),
            extends: raw.extends,
            field_list: raw.field_list,
            method_list: raw.method_list,
            heaps: Some(context.heaps().clone()),
            custom_attributes: OnceCell::new(),
            full_name: OnceCell::new(),
            raw,
            dirty: false,
        })
    }

    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()> {
        let type_name = match context.reusable(self.name.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_string(self.name()?)?,
        };
        let type_namespace = match context.reusable(self.namespace.source(), self.heaps.as_ref()) {
            Some(offset) => offset,
            None => context.intern_string(self.namespace()?)?,
        };

        self.raw = TypeDefRaw {
            rid: self.token.row(),
            token: self.token,
            offset: self.raw.offset,
            flags: self.flags,
            type_name,
            type_namespace,
            extends: self.extends,
            field_list: self.field_list,
            method_list: self.method_list,
        };
        self.dirty = false;
        Ok(())
    }

    fn raw(&self) -> &TypeDefRaw {
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
        self.namespace()?;
        Ok(())
    }
}

impl Resolvable for TypeDef {
    type Definition = TypeDef;

    fn resolve(&self) -> Option<&TypeDef> {
        Some(self)
    }
}
