//! Low-level, bounds-checked little-endian reading and writing.
//!
//! Every metadata row is a tuple of little-endian integers, some of which are 2 or 4 bytes wide
//! depending on the size of the heap or table they index. This module provides the primitive
//! operations the row readers and writers are built from:
//!
//! - [`crate::file::io::read_le`] / [`crate::file::io::read_le_at`] - fixed-width reads
//! - [`crate::file::io::read_le_at_dyn`] - 2-or-4 byte index reads
//! - [`crate::file::io::write_le_at`] / [`crate::file::io::write_le_at_dyn`] - the mirrored writes
//!
//! All functions return [`crate::Error::OutOfBounds`] instead of panicking when the buffer is too
//! short, and advance the offset only on success.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn};
//!
//! let mut data = [0u8; 8];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x0102_u16)?;
//! write_le_at_dyn(&mut data, &mut offset, 0x0304, false)?;
//! write_le_at_dyn(&mut data, &mut offset, 0x0506, false)?;
//! assert_eq!(offset, 6);
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0x0102);
//! assert_eq!(read_le_at_dyn(&data, &mut offset, false)?, 0x0304);
//! # Ok::<(), cilmeta::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Primitive types that can be read from and written to little-endian byte buffers.
pub trait CilIO: Sized {
    /// The fixed-size byte representation of this type
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Build a value from its little-endian representation
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Produce the little-endian representation of this value
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cil_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value of type `T` at `offset`, advancing `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Read a heap or table index that is either 2 (`is_large == false`) or 4 bytes wide.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too short.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}

/// Write `value` at `offset`, advancing `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer has no room for the value.
pub fn write_le_at<T: CilIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;
    Ok(())
}

/// Write a heap or table index as 2 (`is_large == false`) or 4 bytes.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer has no room, or
/// [`crate::Error::Malformed`] if a 2-byte index is requested for a value above `u16::MAX`.
pub fn write_le_at_dyn(
    data: &mut [u8],
    offset: &mut usize,
    value: u32,
    is_large: bool,
) -> Result<()> {
    if is_large {
        write_le_at::<u32>(data, offset, value)?;
    } else {
        let Ok(small) = u16::try_from(value) else {
            return Err(malformed_error!(
                "Index {:#x} does not fit a 2-byte column",
                value
            ));
        };
        write_le_at::<u16>(data, offset, small)?;
    }

    Ok(())
}
