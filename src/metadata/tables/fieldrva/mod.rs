//! The `FieldRVA` table (0x1D, II.22.18).
//!
//! Gives the relative virtual address of the initial data of a field (static arrays, `.data`
//! backed globals). The field must have `HasFieldRVA` set.

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
