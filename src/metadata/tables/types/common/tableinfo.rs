//! Index-width layout shared by every table of one image.
//!
//! Whether a heap index, a simple table index or a coded index column is 2 or 4 bytes wide
//! depends on the size of the heap or tables it references. [`TableInfo`] captures that
//! decision once per read or build pass and is threaded through every row size computation,
//! read and write of that pass.

use std::sync::Arc;

use bitflags::bitflags;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::tables::types::common::{CodedIndexType, TableId, TABLE_COUNT},
    Result,
};

bitflags! {
    /// The `HeapSizes` byte of the tables stream header (II.24.2.6).
    ///
    /// A set bit means indices into that heap are 4 bytes wide.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HeapSizes: u8 {
        /// `#Strings` indices are 4 bytes
        const STRINGS = 0x01;
        /// `#GUID` indices are 4 bytes
        const GUID = 0x02;
        /// `#Blob` indices are 4 bytes
        const BLOB = 0x04;
    }
}

impl HeapSizes {
    /// Derive the flags from the byte lengths of the three heaps.
    ///
    /// A heap needs 4-byte indices once its size no longer fits into 16 bits.
    #[must_use]
    pub fn from_lengths(strings: usize, guid: usize, blob: usize) -> Self {
        let limit = usize::from(u16::MAX);
        let mut flags = HeapSizes::empty();
        flags.set(HeapSizes::STRINGS, strings > limit);
        flags.set(HeapSizes::GUID, guid > limit);
        flags.set(HeapSizes::BLOB, blob > limit);
        flags
    }
}

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::MAX`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` for a table with `rows` rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// `TableInfo` holds the row count of every table and the resulting width of every kind of
/// index column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    heap_sizes: HeapSizes,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl Default for TableInfo {
    fn default() -> Self {
        TableInfo::new(std::iter::empty(), HeapSizes::empty())
    }
}

impl TableInfo {
    /// Build the layout for the given row counts and heap flags.
    ///
    /// Tables not listed have zero rows.
    pub fn new(row_counts: impl IntoIterator<Item = (TableId, u32)>, heap_sizes: HeapSizes) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::new(0); TABLE_COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            heap_sizes,
        };

        for (table_id, rows) in row_counts {
            table_info.rows[table_id as usize] = TableRowInfo::new(rows);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * 'valid_tables'    - A slice of tuples, which provides (table_id, row_count) of the valid tables
    /// * 'large_str'       - Specify if the #String heap indexes are 4 or 2 bytes
    /// * 'large_blob'      - Specify if the #Blob heap indexes are 4 or 2 bytes
    /// * 'large_guid'      - Specify if the #GUID heap indexes are 4 or 2 bytes
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut heap_sizes = HeapSizes::empty();
        heap_sizes.set(HeapSizes::STRINGS, large_str);
        heap_sizes.set(HeapSizes::BLOB, large_blob);
        heap_sizes.set(HeapSizes::GUID, large_guid);

        TableInfo::new(valid_tables.iter().copied(), heap_sizes)
    }

    /// Decodes a coded index value into its component table and row index.
    ///
    /// # Errors
    /// Returns an error if the tag value is out of bounds for the coded index type
    pub fn decode_coded_index(
        &self,
        value: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(TableId, u32)> {
        let tables = coded_index_type.tables();
        let tag_bits = coded_index_type.tag_bits();
        let tag_mask = (1 << tag_bits) - 1;

        let tag = value & tag_mask;
        let index = value >> tag_bits;

        if tag as usize >= tables.len() {
            return Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                coded_index_type
            ));
        }

        Ok((tables[tag as usize], index))
    }

    /// The heap flags this layout was computed with
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.heap_sizes
    }

    /// Returns true, if a requested table is larger than 2^16 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#String' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::STRINGS)
    }

    /// Indicates the size of indexes referring into the '#Guid' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::GUID)
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::BLOB)
    }

    /// Width of a '#String' heap index in bytes
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_str() {
            4
        } else {
            2
        }
    }

    /// Width of a '#GUID' heap index in bytes
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_guid() {
            4
        } else {
            2
        }
    }

    /// Width of a '#Blob' heap index in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_blob() {
            4
        } else {
            2
        }
    }

    /// Returns the row information of a specific table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Number of rows of a specific table
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Returns the number of bits required to represent an index into a specific table.
    #[must_use]
    pub fn table_index_bits(&self, table_id: TableId) -> u8 {
        self.rows[table_id as usize].bits
    }

    /// Returns the number of bytes required to represent an index into a specific table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Returns the cached byte size for a specific coded index reference.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Tables and heaps whose index width differs between `self` and `other`.
    ///
    /// Used to report layout flips between the source image and a rebuilt one.
    #[must_use]
    pub fn width_changes(&self, other: &TableInfo) -> Vec<String> {
        let mut changes = Vec::new();

        if self.str_bytes() != other.str_bytes() {
            changes.push(format!("#Strings {} -> {}", self.str_bytes(), other.str_bytes()));
        }
        if self.guid_bytes() != other.guid_bytes() {
            changes.push(format!("#GUID {} -> {}", self.guid_bytes(), other.guid_bytes()));
        }
        if self.blob_bytes() != other.blob_bytes() {
            changes.push(format!("#Blob {} -> {}", self.blob_bytes(), other.blob_bytes()));
        }
        for table in TableId::iter() {
            let (old, new) = (self.table_index_bytes(table), other.table_index_bytes(table));
            if old != new {
                changes.push(format!("{table:?} {old} -> {new}"));
            }
        }

        changes
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .map(|table| self.table_index_bits(*table))
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_sizes_threshold() {
        assert_eq!(HeapSizes::from_lengths(0xFFFF, 0, 0), HeapSizes::empty());
        assert_eq!(HeapSizes::from_lengths(0x1_0000, 0, 0), HeapSizes::STRINGS);
        assert_eq!(
            HeapSizes::from_lengths(0, 0x1_0000, 0x1_0000),
            HeapSizes::GUID | HeapSizes::BLOB
        );
    }

    #[test]
    fn simple_index_threshold() {
        let info = TableInfo::new([(TableId::Field, 0xFFFF)], HeapSizes::empty());
        assert_eq!(info.table_index_bytes(TableId::Field), 2);

        let info = TableInfo::new([(TableId::Field, 0x1_0000)], HeapSizes::empty());
        assert_eq!(info.table_index_bytes(TableId::Field), 4);
        assert!(info.is_large(TableId::Field));
    }

    #[test]
    fn coded_index_threshold() {
        // HasConstant has 2 tag bits, so 14 bits remain for the row
        let info = TableInfo::new([(TableId::Field, 0x3FFF)], HeapSizes::empty());
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 2);

        let info = TableInfo::new([(TableId::Field, 0x4000)], HeapSizes::empty());
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
    }

    #[test]
    fn decode() {
        let info = TableInfo::default();
        assert_eq!(
            info.decode_coded_index(0x202, CodedIndexType::HasConstant)
                .unwrap(),
            (TableId::Property, 128)
        );
        assert!(info
            .decode_coded_index(0x3, CodedIndexType::HasConstant)
            .is_err());
    }

    #[test]
    fn width_changes() {
        let small = TableInfo::new_test(&[], false, false, false);
        let large = TableInfo::new_test(&[], true, false, false);
        assert!(small.width_changes(&small).is_empty());
        assert_eq!(small.width_changes(&large), vec!["#Strings 2 -> 4".to_string()]);
    }
}
