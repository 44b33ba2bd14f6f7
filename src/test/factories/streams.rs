//! Crafted heaps and tables streams.

use std::sync::Arc;

use crate::metadata::{
    config::LoadConfig,
    context::ReadingContext,
    streams::{Blob, Guid, Heaps, MetadataStreams, Strings, UserStrings},
    tables::{HeapSizes, TableId, TableInfo},
};

/// Heaps over the given `#Strings` and `#Blob` bytes, with empty `#GUID` and `#US` heaps
pub fn heaps(strings: &[u8], blob: &[u8]) -> Arc<Heaps> {
    Arc::new(Heaps {
        strings: Strings::from(strings).unwrap(),
        blob: Blob::from(blob).unwrap(),
        guid: Guid::empty(),
        user_strings: UserStrings::empty(),
    })
}

/// A reading context with 2-byte heap indices, the given row counts and default validation
pub fn reading_context(heaps: Arc<Heaps>, rows: &[(TableId, u32)]) -> ReadingContext {
    let info = Arc::new(TableInfo::new(rows.iter().copied(), HeapSizes::empty()));
    ReadingContext::new(info, heaps, LoadConfig::default())
}

/// A small image as a compiler would emit it:
///
/// - `Module`: `Crafted.dll`, Mvid at `#GUID` index 1
/// - `TypeDef`: `<Module>` without fields, `Demo.Holder` (extends `TypeRef` 1) owning both fields
/// - `Field`: private `int32 _value`, public static literal `int32 Answer`
/// - `Constant`: `Answer = 42`
pub fn crafted_streams() -> MetadataStreams {
    #[rustfmt::skip]
    let strings = b"\0Crafted.dll\0<Module>\0Holder\0Demo\0_value\0Answer\0".to_vec();

    #[rustfmt::skip]
    let blob = vec![
        0x00,
        0x02, 0x06, 0x08,                   // 0x01: FIELD I4
        0x04, 0x2A, 0x00, 0x00, 0x00,       // 0x04: 42
    ];

    #[rustfmt::skip]
    let guid = vec![
        0xD4, 0x5E, 0x1D, 0x6C, 0x2F, 0x9D, 0x0C, 0x4E,
        0xA3, 0xCB, 0x0D, 0x6A, 0x1C, 0x3A, 0x8B, 0x20,
    ];

    #[rustfmt::skip]
    let tables = vec![
        // header
        0x00, 0x00, 0x00, 0x00,                         // reserved
        0x02, 0x00,                                     // version 2.0
        0x00,                                           // heap sizes
        0x01,                                           // reserved
        0x15, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: Module, TypeDef, Field, Constant
        0x00, 0xFA, 0x01, 0x33, 0x00, 0x16, 0x00, 0x00, // sorted
        0x01, 0x00, 0x00, 0x00,                         // Module rows
        0x02, 0x00, 0x00, 0x00,                         // TypeDef rows
        0x02, 0x00, 0x00, 0x00,                         // Field rows
        0x01, 0x00, 0x00, 0x00,                         // Constant rows
        // Module
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
        // TypeDef
        0x00, 0x00, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
        0x01, 0x00, 0x10, 0x00, 0x16, 0x00, 0x1D, 0x00, 0x05, 0x00, 0x01, 0x00, 0x01, 0x00,
        // Field
        0x01, 0x00, 0x22, 0x00, 0x01, 0x00,
        0x56, 0x80, 0x29, 0x00, 0x01, 0x00,
        // Constant
        0x08, 0x00, 0x08, 0x00, 0x04, 0x00,
    ];

    MetadataStreams {
        tables,
        strings,
        blob,
        guid,
        user_strings: vec![0x00],
    }
}
