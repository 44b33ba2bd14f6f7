//! The `Constant` table (0x0B, II.22.9).
//!
//! Stores compile-time default values for fields, parameters and properties. The value lives in
//! the `#Blob` heap and is decoded according to the element type stored in the row, see
//! [`ConstantValue`].

mod builder;
mod owned;
mod raw;
mod value;

pub use builder::*;
pub use owned::*;
pub use raw::*;
pub use value::*;
