//! Factory methods for test data.
//!
//! Stream images are crafted byte by byte so that tests can check exact offsets and widths;
//! headers are built through the public helpers so they always carry consistent relations.

mod headers;
mod streams;

pub use headers::widget_header;
pub use streams::{crafted_streams, heaps, reading_context};
