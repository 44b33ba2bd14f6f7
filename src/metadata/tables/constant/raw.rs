use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, RowWritable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// The raw form of a `Constant` row
pub struct ConstantRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset of the row in the table data it was read from
    pub offset: usize,
    /// a 1-byte constant (`ELEMENT_TYPE_*`)
    pub base: u8,
    /// the 1-byte padding zero; kept as read
    pub padding: u8,
    /// an index into the Param, Field, or Property table; more precisely, a `HasConstant`
    /// (§II.24.2.6) coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl Default for ConstantRaw {
    fn default() -> Self {
        ConstantRaw {
            rid: 0,
            token: Token::default(),
            offset: 0,
            base: 0,
            padding: 0,
            parent: CodedIndex::new(TableId::Field, 0),
            value: 0,
        }
    }
}

impl RowReadable for ConstantRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* c_type */    1 +
            /* padding */   1 +
            /* parent */    sizes.coded_index_bytes(CodedIndexType::HasConstant) +
            /* value */     sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        let offset_org = *offset;

        Ok(ConstantRaw {
            rid,
            token: Token::from_parts(TableId::Constant, rid),
            offset: offset_org,
            base: read_le_at::<u8>(data, offset)?,
            padding: read_le_at::<u8>(data, offset)?,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasConstant)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for ConstantRaw {
    fn row_write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()> {
        write_le_at(data, offset, self.base)?;
        write_le_at(data, offset, self.padding)?;
        self.parent
            .write(data, offset, sizes, CodedIndexType::HasConstant)?;
        write_le_at_dyn(data, offset, self.value, sizes.is_large_blob())?;
        Ok(())
    }
}
