//! Small helpers shared across the metadata modules.

mod compression;
mod flags;

pub use compression::write_compressed_uint;
pub use flags::{get_masked_attribute, set_flag, set_masked_attribute};
pub(crate) use flags::{masked_flags, single_flags};
