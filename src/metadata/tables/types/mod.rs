//! The generic table machinery shared by every metadata table.
//!
//! - [`MetadataTable`]: the owned, ordered rows of one table and the read / update / write
//!   passes over them
//! - [`MetadataEntity`]: the contract between a table and its entity type
//! - [`RowReadable`] / [`RowWritable`]: decoding and encoding of the raw row tuples
//! - [`LazyValue`] / [`BackRef`]: deferred heap values and cached back-references
//! - [`TableInfo`]: the index-width layout of one pass
//! - [`TableAccess`]: typed access to the tables of a [`crate::metadata::streams::TablesStream`]

mod access;
mod common;
mod entity;
mod lazy;
mod read;
mod table;
mod write;

pub(crate) use access::impl_table_access;
pub use access::TableAccess;
pub use common::*;
pub use entity::{MetadataEntity, Resolvable};
pub use lazy::{BackRef, LazyValue};
pub use read::RowReadable;
pub use table::MetadataTable;
pub(crate) use table::MAX_ROWS;
pub use write::RowWritable;
