//! Metadata streams: the four heaps and the `#~` tables stream.
//!
//! Each heap comes as a pair: a read-only view ([`Strings`], [`Blob`], [`Guid`],
//! [`UserStrings`]) that parsed entities resolve their deferred values against, and an
//! append-only buffer ([`StringsBuffer`], [`BlobBuffer`], [`GuidBuffer`],
//! [`UserStringsBuffer`]) that a build pass interns values into.
//!
//! The views of one image are grouped in [`Heaps`] and shared through an `Arc` by every entity
//! parsed from that image. [`MetadataStreams`] is the raw byte form of all five streams, the
//! input of a load and the output of a write.

mod blob;
mod guid;
mod strings;
mod tablesheader;
mod userstrings;

pub use blob::{Blob, BlobBuffer};
pub use guid::{Guid, GuidBuffer};
pub use strings::{Strings, StringsBuffer};
pub use tablesheader::TablesStream;
pub use userstrings::{UserStrings, UserStringsBuffer};

use crate::Result;

/// The heaps of one image.
pub struct Heaps {
    /// `#Strings`
    pub strings: Strings,
    /// `#Blob`
    pub blob: Blob,
    /// `#GUID`
    pub guid: Guid,
    /// `#US`
    pub user_strings: UserStrings,
}

impl Heaps {
    /// Heaps holding only their mandatory empty entries
    #[must_use]
    pub fn empty() -> Self {
        Heaps {
            strings: Strings::empty(),
            blob: Blob::empty(),
            guid: Guid::empty(),
            user_strings: UserStrings::empty(),
        }
    }

    /// Parse the heaps of `streams`. A missing (zero length) heap is treated as empty.
    ///
    /// # Errors
    /// Returns an error if a present heap is malformed.
    pub fn from_streams(streams: &MetadataStreams) -> Result<Self> {
        Ok(Heaps {
            strings: if streams.strings.is_empty() {
                Strings::empty()
            } else {
                Strings::from(&streams.strings)?
            },
            blob: if streams.blob.is_empty() {
                Blob::empty()
            } else {
                Blob::from(&streams.blob)?
            },
            guid: Guid::from(&streams.guid)?,
            user_strings: if streams.user_strings.is_empty() {
                UserStrings::empty()
            } else {
                UserStrings::from(&streams.user_strings)?
            },
        })
    }
}

/// The raw bytes of the tables stream and the four heaps.
///
/// Locating these streams inside a PE image (metadata root, stream headers) is left to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStreams {
    /// `#~`
    pub tables: Vec<u8>,
    /// `#Strings`
    pub strings: Vec<u8>,
    /// `#Blob`
    pub blob: Vec<u8>,
    /// `#GUID`
    pub guid: Vec<u8>,
    /// `#US`
    pub user_strings: Vec<u8>,
}
