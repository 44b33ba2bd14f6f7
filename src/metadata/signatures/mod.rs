//! Field signatures (II.23.2.4).
//!
//! Field entities keep their signature as a deferred value; it is decoded from the `#Blob` heap
//! on first access with [`parse_field_signature`] and encoded again with
//! [`encode_field_signature`] when a modified field is rebuilt.
//!
//! Only the element types that can appear in a field signature without a full method
//! signature are supported: primitives, class and value type tokens, single-dimensional arrays,
//! pointers, by-refs, generic parameters, generic instantiations and custom modifiers.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::signatures::{
//!     encode_field_signature, parse_field_signature, SignatureField, TypeSignature,
//! };
//!
//! let signature = parse_field_signature(&[0x06, 0x08])?;
//! assert_eq!(signature, SignatureField::new(TypeSignature::I4));
//! assert_eq!(encode_field_signature(&signature)?, vec![0x06, 0x08]);
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod encoders;
mod parser;
mod types;

pub use encoders::encode_field_signature;
pub use parser::SignatureParser;
pub use types::*;

use crate::Result;

/// Parse a `FieldSignature` from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_field_signature(data: &[u8]) -> Result<SignatureField> {
    let mut parser = SignatureParser::new(data);
    parser.parse_field_signature()
}
