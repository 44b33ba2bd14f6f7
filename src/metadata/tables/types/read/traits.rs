use crate::{metadata::tables::types::common::TableInfoRef, Result};

/// Trait implemented by every raw row type that can be decoded from a tables stream.
///
/// A row is a fixed tuple of little-endian columns. Heap and table index columns are 2 or 4
/// bytes wide depending on `sizes`, so the row size is only known once the layout of the
/// current pass has been computed.
pub trait RowReadable: Sized + Send {
    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// ## Arguments
    ///
    /// * `sizes` - Table size information containing heap sizes and table row counts
    ///   used to determine the appropriate index sizes
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads and parses a single row from the provided byte buffer.
    ///
    /// Consumes exactly [`RowReadable::row_size`] bytes and advances `offset` past them. The
    /// row ID follows the 1-based indexing of ECMA-335.
    ///
    /// ## Arguments
    ///
    /// * `data` - The byte buffer containing the table data to read from
    /// * `offset` - Mutable reference to the current read position
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// ## Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the buffer does not hold a complete row, or
    /// [`crate::Error::Malformed`] for an undecodable coded index.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}
