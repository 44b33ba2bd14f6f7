use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The raw form of a `FieldMarshal` row
pub struct FieldMarshalRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset of the row in the table data it was read from
    pub offset: usize,
    /// an index into Field or Param table; more precisely, a `HasFieldMarshal` (§II.24.2.6)
    /// coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub native_type: u32,
}

impl Default for FieldMarshalRaw {
    fn default() -> Self {
        FieldMarshalRaw {
            rid: 0,
            token: Token::default(),
            offset: 0,
            parent: CodedIndex::new(TableId::Field, 0),
            native_type: 0,
        }
    }
}

impl RowReadable for FieldMarshalRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */      sizes.coded_index_bytes(CodedIndexType::HasFieldMarshal) +
            /* native_type */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldMarshalRaw {
            rid,
            token: Token::from_parts(TableId::FieldMarshal, rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for FieldMarshalRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        self.parent
            .write(data, offset, sizes, CodedIndexType::HasFieldMarshal)?;
        write_le_at_dyn(data, offset, self.native_type, sizes.is_large_blob())?;
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
            0x03, 0x00, // parent (tag 1 = Param, index 1)
            0x02, 0x02, // native_type
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Param, 1)],
            false,
            false,
            false,
        ));
        assert_eq!(FieldMarshalRaw::row_size(&sizes), 4);

        let mut offset = 0;
        let row = FieldMarshalRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(row.token.value(), 0x0D000001);
        assert_eq!(row.parent, CodedIndex::new(TableId::Param, 1));
        assert_eq!(row.native_type, 0x0202);

        let mut written = vec![0u8; 4];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x02, 0x00, 0x00, 0x01, // parent (tag 0 = Field)
            0x02, 0x02, 0x02, 0x02, // native_type
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Field, u32::from(u16::MAX) + 2)],
            true,
            true,
            true,
        ));
        assert_eq!(FieldMarshalRaw::row_size(&sizes), 8);

        let mut offset = 0;
        let row = FieldMarshalRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(row.parent, CodedIndex::new(TableId::Field, 0x0100_0002 >> 1));
        assert_eq!(row.native_type, 0x02020202);

        let mut written = vec![0u8; 8];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }
}
