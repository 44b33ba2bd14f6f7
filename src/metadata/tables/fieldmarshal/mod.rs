//! The `FieldMarshal` table (0x0D, II.22.17).
//!
//! Links a field or parameter to the native type descriptor the runtime uses when marshalling
//! it across the managed/unmanaged boundary. The descriptor blob is kept as raw bytes.

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
