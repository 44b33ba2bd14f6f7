//! Encoding of raw rows.

mod traits;

pub use traits::RowWritable;
