use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The raw form of a `Field` row, with heap indices unresolved
pub struct FieldRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset of the row in the table data it was read from
    pub offset: usize,
    /// a 2-byte bitmask of type `FieldAttributes`, §II.23.1.5
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub signature: u32,
}

impl RowReadable for FieldRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */     2 +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldRaw {
            rid,
            token: Token::from_parts(TableId::Field, rid),
            offset: *offset,
            flags: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for FieldRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        let Ok(flags) = u16::try_from(self.flags) else {
            return Err(malformed_error!("Field flags {:#x} exceed 16 bits", self.flags));
        };

        write_le_at(data, offset, flags)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.signature, sizes.is_large_blob())?;
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
            0x01, 0x01, // flags
            0x02, 0x02, // name
            0x03, 0x03, // signature
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Field, 1)],
            false,
            false,
            false,
        ));
        assert_eq!(FieldRaw::row_size(&sizes), 6);

        let mut offset = 0;
        let row = FieldRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x04000001);
        assert_eq!(row.flags, 0x0101);
        assert_eq!(row.name, 0x0202);
        assert_eq!(row.signature, 0x0303);

        let mut written = vec![0u8; 6];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // name
            0x03, 0x03, 0x03, 0x03, // signature
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Field, 1)],
            true,
            true,
            true,
        ));
        assert_eq!(FieldRaw::row_size(&sizes), 10);

        let mut offset = 0;
        let row = FieldRaw::row_read(&data, &mut offset, 1, &sizes).unwrap();
        assert_eq!(row.flags, 0x0101);
        assert_eq!(row.name, 0x02020202);
        assert_eq!(row.signature, 0x03030303);

        let mut written = vec![0u8; 10];
        let mut offset = 0;
        row.row_write(&mut written, &mut offset, &sizes).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn truncated() {
        let sizes = Arc::new(TableInfo::new_test(&[], false, false, false));
        let mut offset = 0;
        assert!(FieldRaw::row_read(&[0x01, 0x00, 0x02], &mut offset, 1, &sizes).is_err());
    }

    #[test]
    fn narrow_column_overflow() {
        let sizes = Arc::new(TableInfo::new_test(&[], false, false, false));
        let row = FieldRaw {
            name: 0x1_0000,
            ..FieldRaw::default()
        };
        let mut data = vec![0u8; 6];
        let mut offset = 0;
        assert!(row.row_write(&mut data, &mut offset, &sizes).is_err());
    }
}
