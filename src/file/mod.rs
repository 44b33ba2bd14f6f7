//! Byte-level access shared by every table and heap.
//!
//! - [`io`] - bounds-checked little-endian reads and writes, including the 2-or-4 byte index
//!   columns whose width is decided by the current [`crate::metadata::tables::TableInfo`]
//! - [`parser`] - a cursor over blob content with ECMA-335 compressed integer support

pub mod io;
pub mod parser;
