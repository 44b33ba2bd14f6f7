//! Coded indices (II.24.2.6).
//!
//! A coded index packs "which table" and "which row" into one column: the low bits hold a tag
//! selecting one of a fixed list of tables, the remaining bits the row. Its width is 2 bytes if
//! the largest referenced table still fits in the bits left over after the tag, else 4.
//!
//! - [`CodedIndexType`]: the coded index kinds and the tables each one may reference
//! - [`CodedIndex`]: a decoded value (table, row, token)

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{TableId, TableInfo},
        token::Token,
    },
    Error, Result,
};

/// The coded index kinds of ECMA-335 II.24.2.6.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef`, `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param`, `Property`
    HasConstant,
    /// Any entity that can carry a custom attribute
    HasCustomAttribute,
    /// `Field`, `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef`, `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, `TypeSpec`
    MemberRefParent,
    /// `Event`, `Property`
    HasSemantics,
    /// `MethodDef`, `MemberRef`
    MethodDefOrRef,
    /// `Field`, `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef`, `ExportedType`
    Implementation,
    /// Tags 2 (`MethodDef`) and 3 (`MemberRef`); 0, 1 and 4 are unused
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef`, `TypeRef`
    ResolutionScope,
    /// `TypeDef`, `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The tables addressed by this coded index, indexed by tag.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity,
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasFieldMarshal => &[TableId::Field, TableId::Param],
            CodedIndexType::HasDeclSecurity => {
                &[TableId::TypeDef, TableId::MethodDef, TableId::Assembly]
            }
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::MethodDefOrRef => &[TableId::MethodDef, TableId::MemberRef],
            CodedIndexType::MemberForwarded => &[TableId::Field, TableId::MethodDef],
            CodedIndexType::Implementation => {
                &[TableId::File, TableId::AssemblyRef, TableId::ExportedType]
            }
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
            CodedIndexType::TypeOrMethodDef => &[TableId::TypeDef, TableId::MethodDef],
        }
    }

    /// Number of low bits used for the tag
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let count = self.tables().len();
        // ceil(log2(count)) for count >= 2
        #[allow(clippy::cast_possible_truncation)]
        let bits = (usize::BITS - (count - 1).leading_zeros()) as u8;
        bits
    }

    /// The tag under which `table` is encoded, if this coded index can reference it
    #[must_use]
    pub fn tag_of(&self, table: TableId) -> Option<u32> {
        let tables = self.tables();
        // CustomAttributeType only uses tags 2 and 3
        let position = match self {
            CodedIndexType::CustomAttributeType => match table {
                TableId::MethodDef => Some(2),
                TableId::MemberRef => Some(3),
                _ => None,
            },
            _ => tables.iter().position(|t| *t == table),
        }?;

        u32::try_from(position).ok()
    }
}

/// A decoded coded index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The table this index points into
    pub tag: TableId,
    /// The 1-based row (0 for a null reference)
    pub row: u32,
    /// The token of the referenced row
    pub token: Token,
}

impl CodedIndex {
    /// Create a coded index pointing at `row` of `tag`.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Read and decode a coded index column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data or [`crate::Error::Malformed`]
    /// for a tag that does not exist for `ci_type`.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfo,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let coded_index = read_le_at_dyn(data, offset, info.coded_index_bytes(ci_type) == 4)?;
        let (tag, row) = info.decode_coded_index(coded_index, ci_type)?;
        Ok(CodedIndex::new(tag, row))
    }

    /// Encode this index for `ci_type`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `ci_type` cannot reference this table.
    pub fn encode(&self, ci_type: CodedIndexType) -> Result<u32> {
        let Some(tag) = ci_type.tag_of(self.tag) else {
            return Err(malformed_error!(
                "Table {:?} cannot be referenced by {:?}",
                self.tag,
                ci_type
            ));
        };

        Ok((self.row << ci_type.tag_bits()) | tag)
    }

    /// Encode and write this index with the width `info` assigns to `ci_type`.
    ///
    /// # Errors
    /// Returns an error if the table is not valid for `ci_type` or the buffer is too small.
    pub fn write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        info: &TableInfo,
        ci_type: CodedIndexType,
    ) -> Result<()> {
        write_le_at_dyn(
            data,
            offset,
            self.encode(ci_type)?,
            info.coded_index_bytes(ci_type) == 4,
        )
    }
}

impl TryFrom<Token> for CodedIndex {
    type Error = Error;

    fn try_from(token: Token) -> Result<Self> {
        match token.table_id() {
            Some(table) => Ok(CodedIndex::new(table, token.row())),
            None => Err(malformed_error!("Unknown table ID: 0x{:02x}", token.table())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bits() {
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasConstant.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexType::HasFieldMarshal.tag_bits(), 1);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
    }

    #[test]
    fn encode_has_constant() {
        let index = CodedIndex::new(TableId::Property, 128);
        assert_eq!(index.encode(CodedIndexType::HasConstant).unwrap(), 0x202);
        assert_eq!(index.token.value(), 0x1700_0080);
    }

    #[test]
    fn encode_custom_attribute_type() {
        let index = CodedIndex::new(TableId::MemberRef, 1);
        assert_eq!(
            index.encode(CodedIndexType::CustomAttributeType).unwrap(),
            (1 << 3) | 3
        );
    }

    #[test]
    fn encode_invalid_table() {
        let index = CodedIndex::new(TableId::TypeDef, 1);
        assert!(index.encode(CodedIndexType::HasConstant).is_err());
    }

    #[test]
    fn try_from_token() {
        let index = CodedIndex::try_from(Token::new(0x0400_0007)).unwrap();
        assert_eq!(index.tag, TableId::Field);
        assert_eq!(index.row, 7);
        assert!(CodedIndex::try_from(Token::new(0x7F00_0001)).is_err());
    }
}
