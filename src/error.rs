use thiserror::Error;

use crate::metadata::{tables::TableId, token::Token};

/// Helper macro for creating malformed data errors with source location information.
///
/// Captures the current file and line so that format errors found deep inside a table or heap
/// parser point back at the check that rejected the input.
///
/// # Examples
///
/// ```rust,ignore
/// return Err(malformed_error!("String index out of range - {}", index));
/// ```
macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can return.
///
/// Read-time problems (truncated rows, indices outside their heap or table) surface as
/// [`Error::OutOfBounds`] or [`Error::Malformed`] and abort the load of the enclosing table.
/// Mutation-time contract violations are reported as [`Error::ModificationInvalid`] at the call
/// that attempted them. A relation that simply does not exist (a field without a constant) is
/// never an error; accessors return `None` for it.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is structurally invalid.
    ///
    /// Covers heap offsets outside their heap, table indices beyond the referenced table,
    /// malformed signature blobs and invalid heap content.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A read or write would have run past the end of the provided buffer.
    ///
    /// Raised when a table region cannot supply the bytes of a complete row, or when a heap
    /// lookup addresses data past the end of the heap.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The image contains a metadata table this crate has no schema for.
    #[error("Table {0:?} is not supported")]
    NotSupported(TableId),

    /// Provided input was empty
    #[error("Provided input was empty")]
    Empty,

    /// A requested modification is not allowed.
    ///
    /// Returned by builders and mutating helpers when a required value is missing or a
    /// reference points at a row that cannot be its target.
    #[error("Invalid modification - {0}")]
    ModificationInvalid(String),

    /// An entity was mutated after its row was last recomputed.
    ///
    /// Writing it would serialize stale column values, so the write pass refuses. Run a new
    /// build before writing again.
    #[error("Row {0} was modified after the last update pass")]
    StaleRow(Token),

    /// A token does not resolve to a row of the expected table.
    #[error("Failed to resolve token - {0}")]
    TokenNotFound(Token),

    /// A heap-backed value of a parsed entity was requested, but the entity has no heaps
    /// attached to resolve it from.
    #[error("Entity {0} has no heaps attached")]
    Detached(Token),
}
