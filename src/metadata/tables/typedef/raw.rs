use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The raw form of a `TypeDef` row
pub struct TypeDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset of the row in the table data it was read from
    pub offset: usize,
    /// a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15
    pub flags: u32,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a
    /// `TypeDefOrRef` (§II.24.2.6) coded index
    pub extends: CodedIndex,
    /// an index into the Field table; it marks the first of a contiguous run of Fields owned by
    /// this Type
    pub field_list: u32,
    /// an index into the `MethodDef` table; it marks the first of a contiguous run of Methods
    /// owned by this Type
    pub method_list: u32,
}

impl Default for TypeDefRaw {
    fn default() -> Self {
        TypeDefRaw {
            rid: 0,
            token: Token::default(),
            offset: 0,
            flags: 0,
            type_name: 0,
            type_namespace: 0,
            extends: CodedIndex::new(TableId::TypeDef, 0),
            field_list: 0,
            method_list: 0,
        }
    }
}

impl RowReadable for TypeDefRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */             4 +
            /* type_name */         sizes.str_bytes() +
            /* type_namespace */    sizes.str_bytes() +
            /* extends */           sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef) +
            /* field_list */        sizes.table_index_bytes(TableId::Field) +
            /* method_list */       sizes.table_index_bytes(TableId::MethodDef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: Token::from_parts(TableId::TypeDef, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

impl RowWritable for TypeDefRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        write_le_at(data, offset, self.flags)?;
        write_le_at_dyn(data, offset, self.type_name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.type_namespace, sizes.is_large_str())?;
        self.extends
            .write(data, offset, sizes, CodedIndexType::TypeDefOrRef)?;
        write_le_at_dyn(data, offset, self.field_list, sizes.is_large(TableId::Field))?;
        write_le_at_dyn(data, offset, self.method_list, sizes.is_large(TableId::MethodDef))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::TableInfo;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, // type_name
            0x03, 0x03, // type_namespace
            0x00, 0x02, // extends (tag 0 = TypeDef, index 128)
            0x04, 0x04, // field_list
            0x05, 0x05, // method_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::TypeDef, 1), (TableId::Field, 1)],
            false,
            false,
            false,
        ));
        assert_eq!(TypeDefRaw::row_size(&sizes), 14);

        let mut offset = 0;
        let row = TypeDefRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, 14);
        assert_eq!(row.token.value(), 0x02000001);
        assert_eq!(row.flags, 0x01010101);
        assert_eq!(row.type_name, 0x0202);
        assert_eq!(row.type_namespace, 0x0303);
        assert_eq!(row.extends, CodedIndex::new(TableId::TypeDef, 128));
        assert_eq!(row.field_list, 0x0404);
        assert_eq!(row.method_list, 0x0505);

        let mut written = vec![0u8; 14];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // type_name
            0x03, 0x03, 0x03, 0x03, // type_namespace
            0x01, 0x00, 0x00, 0x02, // extends (tag 1 = TypeRef)
            0x04, 0x04, 0x04, 0x04, // field_list
            0x05, 0x05, 0x05, 0x05, // method_list
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[
                (TableId::TypeDef, u32::from(u16::MAX) + 3),
                (TableId::Field, u32::from(u16::MAX) + 3),
                (TableId::MethodDef, u32::from(u16::MAX) + 3),
            ],
            true,
            true,
            true,
        ));
        assert_eq!(TypeDefRaw::row_size(&sizes), 24);

        let mut offset = 0;
        let row = TypeDefRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(row.type_name, 0x02020202);
        assert_eq!(row.type_namespace, 0x03030303);
        assert_eq!(row.extends, CodedIndex::new(TableId::TypeRef, 0x0080_0000));
        assert_eq!(row.field_list, 0x04040404);
        assert_eq!(row.method_list, 0x05050505);

        let mut written = vec![0u8; 24];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }
}
