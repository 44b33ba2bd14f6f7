//! The metadata model of a .NET image.
//!
//! This module contains everything between the raw stream bytes and the entities a user works
//! with:
//!
//! - [`streams`] - the heaps and the `#~` tables stream container
//! - [`tables`] - the modelled tables, their raw rows, entities and builders
//! - [`signatures`] - field signatures stored in the `#Blob` heap
//! - [`token`] - the row references used throughout the model
//! - [`context`] - the per-pass state of reading, building and writing
//! - [`header`] / [`build`] - the owner of one image and its build phases
//! - [`config`] - load and build options
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::prelude::*;
//!
//! let mut header = MetadataHeader::new();
//! header.add_type(TypeDefBuilder::new().name("<Module>").build()?)?;
//! let streams = header.build()?.write()?;
//!
//! let loaded = MetadataHeader::from_streams(&streams, LoadConfig::default())?;
//! assert_eq!(loaded.tables().type_defs.len(), 1);
//! # Ok::<(), cilmeta::Error>(())
//! ```

/// The update and write passes of a build
pub mod build;
/// Load and build configuration
pub mod config;
/// Reading, building and writing contexts
pub mod context;
/// The in-memory metadata of one image
pub mod header;
/// Field signature parsing and encoding
pub mod signatures;
/// Metadata heaps and the tables stream
pub mod streams;
/// The metadata tables
pub mod tables;
/// Metadata tokens
pub mod token;

pub use build::UpdatedMetadata;
pub use header::{BuildPhase, MetadataHeader};
