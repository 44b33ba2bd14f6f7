//! The `CustomAttribute` table (0x0C, II.22.10).
//!
//! Attaches an attribute instance to almost any row of the metadata: the parent, the
//! constructor that creates the attribute, and the argument blob. The blob is kept as raw
//! bytes.

mod owned;
mod raw;

pub use owned::*;
pub use raw::*;
