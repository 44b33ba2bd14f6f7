// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # cilmeta
//!
//! Read, mutate and re-serialize the metadata tables of .NET executables.
//!
//! `cilmeta` works on the tabular part of the ECMA-335 metadata section: the `#~` tables stream
//! and the `#Strings`, `#Blob`, `#GUID` and `#US` heaps it indexes into. Rows are parsed into
//! entities whose heap-backed values are resolved on first access, can be changed or created
//! from scratch, and are written back in a two-phase build that re-interns every modified value
//! and recomputes the width of every index column.
//!
//! Locating the streams inside a PE image is left to the caller; the crate consumes and produces
//! [`metadata::streams::MetadataStreams`].
//!
//! ## Quick Start
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! // Create a fresh image with one type and one field
//! let mut header = MetadataHeader::new();
//! header.add_module("Sample.dll", uguid::guid!("6c1d5ed4-9d2f-4e0c-a3cb-0d6a1c3a8b20"))?;
//! let widget = header.add_type(TypeDefBuilder::new().namespace("Sample").name("Widget").build()?)?;
//! let count = header.add_field(
//!     widget,
//!     FieldBuilder::new()
//!         .name("count")
//!         .flags(FieldAttributes::PUBLIC | FieldAttributes::STATIC)
//!         .signature(SignatureField::new(TypeSignature::I4))
//!         .build()?,
//! )?;
//! header.attach_constant(count, ConstantValue::I4(42))?;
//!
//! // Serialize it and load it again
//! let streams = header.build()?.write()?;
//! let loaded = MetadataHeader::from_streams(&streams, LoadConfig::default())?;
//!
//! let tables = loaded.tables();
//! let field = tables.fields.get(1).unwrap();
//! assert_eq!(field.full_name(tables)?, "System.Int32 Sample.Widget::count");
//! assert_eq!(field.constant(tables).unwrap().value()?, &ConstantValue::I4(42));
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::tables`] - one module per modelled table: raw row, entity, builder
//! - [`metadata::streams`] - heaps and the tables stream container
//! - [`metadata::header`] - the owner of one image, with the build phases in [`metadata::build`]
//! - [`prelude`] - re-exports of the commonly used types
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Standards Compliance
//!
//! Row layouts, coded indices and heap formats follow the **ECMA-335 specification**
//! (6th edition), partition II.
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

#[macro_use]
pub(crate) mod error;
/// Bounds-checked little-endian access and the blob cursor
pub mod file;
pub(crate) mod utils;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilmeta::prelude::*;
///
/// let header = MetadataHeader::new();
/// assert_eq!(header.phase(), BuildPhase::Fresh);
/// ```
pub mod prelude;

/// The ECMA-335 metadata model: heaps, tables, entities and the build passes over them.
pub mod metadata;

/// `cilmeta` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilmeta` Error type
///
/// # Examples
///
/// ```rust
/// use cilmeta::{prelude::*, Error};
///
/// match FieldBuilder::new().name("orphan").build() {
///     Err(Error::ModificationInvalid(message)) => println!("rejected: {message}"),
///     _ => unreachable!(),
/// }
/// ```
pub use error::Error;

/// Cursor over blob content, with ECMA-335 compressed integer support.
///
/// # Example
///
/// ```rust
/// use cilmeta::Parser;
///
/// let mut parser = Parser::new(&[0x81, 0x23]);
/// assert_eq!(parser.read_compressed_uint()?, 0x123);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub use file::parser::Parser;
