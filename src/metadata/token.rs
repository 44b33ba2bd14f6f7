//! Metadata tokens.
//!
//! A token identifies one row of one metadata table: the high byte holds the table id, the low
//! 24 bits the 1-based row index (ECMA-335 II.22). Tokens are the only currency used for
//! cross-references between entities; nothing in the model holds a pointer to another row.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::from_parts(TableId::Field, 3);
//! assert_eq!(token.value(), 0x0400_0003);
//! assert_eq!(token.table_id(), Some(TableId::Field));
//! assert_eq!(token.row(), 3);
//! ```

use std::fmt;

use crate::metadata::tables::TableId;

/// A metadata token: `(table << 24) | row`.
///
/// Two tokens are equal iff they name the same row of the same table. A token with row 0 is the
/// placeholder carried by entities that have not been inserted into a table yet.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from a table and a 1-based row index.
    ///
    /// Only the low 24 bits of `row` are kept.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw 32-bit value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The raw table byte
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table this token points into, if the table byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// The 1-based row index
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true for the all-zero token
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this token names an actual row (row index != 0)
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.row() != 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parts() {
        let token = Token::from_parts(TableId::Constant, 5);
        assert_eq!(token.value(), 0x0B00_0005);
        assert_eq!(token.table(), 0x0B);
        assert_eq!(token.table_id(), Some(TableId::Constant));
        assert_eq!(token.row(), 5);
        assert!(token.is_assigned());
    }

    #[test]
    fn row_is_truncated_to_24_bits() {
        let token = Token::from_parts(TableId::Field, 0x0100_0001);
        assert_eq!(token.value(), 0x0400_0001);
    }

    #[test]
    fn placeholder() {
        let token = Token::from_parts(TableId::Field, 0);
        assert!(!token.is_assigned());
        assert!(!token.is_null());
        assert!(Token::default().is_null());
    }

    #[test]
    fn unknown_table() {
        assert_eq!(Token::new(0x7F00_0001).table_id(), None);
    }

    #[test]
    fn equality_and_hash() {
        let a = Token::from_parts(TableId::Field, 1);
        let b = Token::new(0x0400_0001);
        let c = Token::from_parts(TableId::Param, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a, "field");
        assert_eq!(map.get(&b), Some(&"field"));
    }

    #[test]
    fn formatting() {
        let token = Token::new(0x0600_0001);
        assert_eq!(format!("{token}"), "0x06000001");
        let debug = format!("{token:?}");
        assert!(debug.contains("table: 0x06"));
        assert!(debug.contains("row: 1"));
    }
}
