//! Layout primitives shared by all tables: table identifiers, coded indices and the
//! per-pass index-width information.

mod codedindex;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tableid::{TableId, TABLE_COUNT};
pub use tableinfo::{HeapSizes, TableInfo, TableInfoRef, TableRowInfo};
