use crate::{metadata::tables::types::common::TableInfoRef, Result};

/// Trait implemented by every raw row type that can be serialized back into a tables stream.
///
/// Writing is a pure function of the row values and the layout: no heap lookups happen here,
/// all heap offsets must already be final.
pub trait RowWritable: Sized + Send {
    /// Serialize this row at `offset`, advancing it by the row size of `sizes`.
    ///
    /// ## Arguments
    ///
    /// * `data` - The target buffer, large enough to hold the row at `offset`
    /// * `offset` - Mutable reference to the current write position
    /// * `sizes` - The layout of the current build pass
    ///
    /// ## Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is too small, or
    /// [`crate::Error::Malformed`] if a column value does not fit its width.
    fn row_write(&self, data: &mut [u8], offset: &mut usize, sizes: &TableInfoRef) -> Result<()>;
}
