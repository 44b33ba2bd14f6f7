//! Decoding of raw rows.

mod traits;

pub use traits::RowReadable;
