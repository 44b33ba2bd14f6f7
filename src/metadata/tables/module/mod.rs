//! The `Module` table (0x00, II.22.30).
//!
//! Holds exactly one row describing the module itself: its name and the module version id
//! (`Mvid`) that distinguishes two builds of the same module. `EncId` and `EncBaseId` are only
//! used by edit-and-continue images and are normally 0.

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
