//! The metadata tables (ECMA-335 II.22).
//!
//! Every modelled table lives in its own module with the same layout:
//!
//! - `raw.rs`: the `*Raw` row tuple with its [`RowReadable`] / [`RowWritable`] encoding
//! - `owned.rs`: the user-facing entity with lazy heap values, back-references and flag
//!   accessors, implementing [`MetadataEntity`]
//! - `builder.rs` (where fresh rows are commonly created): a validating builder
//!
//! The generic machinery they share ([`MetadataTable`], [`TableInfo`], [`CodedIndex`], ...) is
//! re-exported from here as well.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! let mut header = MetadataHeader::new();
//! let widget = header.add_type(TypeDefBuilder::new().name("Widget").build()?)?;
//! header.add_field(
//!     widget,
//!     FieldBuilder::new()
//!         .name("count")
//!         .flags(FieldAttributes::PUBLIC)
//!         .signature(SignatureField::new(TypeSignature::I4))
//!         .build()?,
//! )?;
//!
//! let tables = header.tables();
//! let field = tables.fields.get(1).unwrap();
//! assert_eq!(field.declaring_type(tables).unwrap().name()?, "Widget");
//! # Ok::<(), cilmeta::Error>(())
//! ```

mod constant;
mod customattribute;
mod field;
mod fieldmarshal;
mod fieldrva;
mod module;
mod typedef;
mod types;

pub use constant::*;
pub use customattribute::*;
pub use field::*;
pub use fieldmarshal::*;
pub use fieldrva::*;
pub use module::*;
pub use typedef::*;
pub use types::*;

/// The tables this crate can read and write, in stream order.
///
/// A tables stream containing rows of any other table is rejected with
/// [`crate::Error::NotSupported`].
pub const SUPPORTED_TABLES: [TableId; 7] = [
    TableId::Module,
    TableId::TypeDef,
    TableId::Field,
    TableId::Constant,
    TableId::CustomAttribute,
    TableId::FieldMarshal,
    TableId::FieldRVA,
];
