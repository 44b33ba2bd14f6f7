//! The three passes over a tables stream.
//!
//! - [`ReadingContext`]: layout and heaps of a parsed image, plus index validation
//! - [`BuildingContext`]: heap buffers that entity state is interned into while rows are
//!   recomputed
//! - [`WritingContext`]: the final layout rows are serialized with
//!
//! Each pass gets its layout passed in explicitly; there is no global index-width state.

use std::sync::Arc;

use crate::{
    metadata::{
        config::{BuildConfig, LoadConfig},
        streams::{BlobBuffer, GuidBuffer, Heaps, MetadataStreams, StringsBuffer, UserStringsBuffer},
        tables::{CodedIndex, HeapSizes, TableId, TableInfoRef, SUPPORTED_TABLES},
    },
    Result,
};

/// State shared by every row read of one load.
pub struct ReadingContext {
    info: TableInfoRef,
    heaps: Arc<Heaps>,
    config: LoadConfig,
}

impl ReadingContext {
    /// Create a context for reading rows laid out per `info`, resolving against `heaps`.
    #[must_use]
    pub fn new(info: TableInfoRef, heaps: Arc<Heaps>, config: LoadConfig) -> Self {
        ReadingContext {
            info,
            heaps,
            config,
        }
    }

    /// The layout of the stream being read
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// The heaps parsed entities resolve against
    #[must_use]
    pub fn heaps(&self) -> &Arc<Heaps> {
        &self.heaps
    }

    /// The load options
    #[must_use]
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Check that `offset` lies inside the `#Strings` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the offset is out of range.
    pub fn check_string(&self, offset: u32) -> Result<()> {
        if self.config.validate_indices && offset as usize >= self.heaps.strings.len() {
            return Err(malformed_error!(
                "#Strings offset {:#x} out of range (heap size {:#x})",
                offset,
                self.heaps.strings.len()
            ));
        }
        Ok(())
    }

    /// Check that `offset` lies inside the `#Blob` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the offset is out of range.
    pub fn check_blob(&self, offset: u32) -> Result<()> {
        if self.config.validate_indices && offset as usize >= self.heaps.blob.len() {
            return Err(malformed_error!(
                "#Blob offset {:#x} out of range (heap size {:#x})",
                offset,
                self.heaps.blob.len()
            ));
        }
        Ok(())
    }

    /// Check that `index` is 0 or names a GUID of the `#GUID` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the index is out of range.
    pub fn check_guid(&self, index: u32) -> Result<()> {
        if self.config.validate_indices && index as usize > self.heaps.guid.count() {
            return Err(malformed_error!(
                "#GUID index {} out of range ({} entries)",
                index,
                self.heaps.guid.count()
            ));
        }
        Ok(())
    }

    /// Check that `row` is 0 (null) or an existing row of `table`.
    ///
    /// Tables this crate does not model are not checked.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the row does not exist.
    pub fn check_row(&self, table: TableId, row: u32) -> Result<()> {
        if self.config.validate_indices
            && SUPPORTED_TABLES.contains(&table)
            && row > self.info.rows(table)
        {
            return Err(malformed_error!(
                "Index {} into {:?} out of range ({} rows)",
                row,
                table,
                self.info.rows(table)
            ));
        }
        Ok(())
    }

    /// Check the start of a row list into `table`, which may point one past the last row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the index is out of range.
    pub fn check_list(&self, table: TableId, index: u32) -> Result<()> {
        if self.config.validate_indices
            && SUPPORTED_TABLES.contains(&table)
            && index > self.info.rows(table) + 1
        {
            return Err(malformed_error!(
                "List start {} into {:?} out of range ({} rows)",
                index,
                table,
                self.info.rows(table)
            ));
        }
        Ok(())
    }

    /// Check the row a coded index points at, see [`ReadingContext::check_row`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if validation is on and the row does not exist.
    pub fn check_coded(&self, index: &CodedIndex) -> Result<()> {
        self.check_row(index.tag, index.row)
    }
}

/// State of one build pass: the heaps every entity interns its values into.
///
/// The buffers start out as copies of the source image's heaps, so offsets of values that were
/// never overwritten stay valid and are reused as they are.
pub struct BuildingContext {
    source: Arc<Heaps>,
    strings: StringsBuffer,
    blob: BlobBuffer,
    guid: GuidBuffer,
    user_strings: UserStringsBuffer,
    config: BuildConfig,
}

impl BuildingContext {
    /// Start a build seeded with the heaps of `source`.
    #[must_use]
    pub fn new(source: Arc<Heaps>, config: BuildConfig) -> Self {
        let dedup = config.deduplicate_heaps;
        BuildingContext {
            strings: StringsBuffer::seeded(&source.strings, dedup),
            blob: BlobBuffer::seeded(&source.blob, dedup),
            guid: GuidBuffer::seeded(&source.guid, dedup),
            user_strings: UserStringsBuffer::seeded(&source.user_strings, dedup),
            source,
            config,
        }
    }

    /// The build options
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The offset a deferred value can keep, if any.
    ///
    /// Only a value that still carries its source offset and was parsed from the heaps this
    /// build is seeded with can keep it; everything else has to be interned.
    #[must_use]
    pub fn reusable(&self, source: Option<u32>, heaps: Option<&Arc<Heaps>>) -> Option<u32> {
        match heaps {
            Some(heaps) if Arc::ptr_eq(heaps, &self.source) => source,
            _ => None,
        }
    }

    /// Intern into `#Strings`
    ///
    /// # Errors
    /// See [`StringsBuffer::intern`].
    pub fn intern_string(&mut self, value: &str) -> Result<u32> {
        self.strings.intern(value)
    }

    /// Intern into `#Blob`
    ///
    /// # Errors
    /// See [`BlobBuffer::intern`].
    pub fn intern_blob(&mut self, value: &[u8]) -> Result<u32> {
        self.blob.intern(value)
    }

    /// Intern into `#GUID`
    ///
    /// # Errors
    /// See [`GuidBuffer::intern`].
    pub fn intern_guid(&mut self, value: &uguid::Guid) -> Result<u32> {
        self.guid.intern(value)
    }

    /// Intern into `#US`
    ///
    /// # Errors
    /// See [`UserStringsBuffer::intern`].
    pub fn intern_user_string(&mut self, value: &str) -> Result<u32> {
        self.user_strings.intern(value)
    }

    /// Index widths implied by the current heap sizes.
    ///
    /// With [`BuildConfig::preserve_index_sizes`] the source image's widths act as a minimum.
    #[must_use]
    pub fn heap_sizes(&self, source: HeapSizes) -> HeapSizes {
        let sizes = HeapSizes::from_lengths(self.strings.len(), self.guid.len(), self.blob.len());
        if self.config.preserve_index_sizes {
            sizes | source
        } else {
            sizes
        }
    }

    /// Finish the heaps. The `tables` stream of the result is left empty.
    #[must_use]
    pub fn into_streams(self) -> MetadataStreams {
        MetadataStreams {
            tables: Vec::new(),
            strings: self.strings.into_bytes(),
            blob: self.blob.into_bytes(),
            guid: self.guid.into_bytes(),
            user_strings: self.user_strings.into_bytes(),
        }
    }
}

/// The final layout of a build pass.
pub struct WritingContext {
    info: TableInfoRef,
    parallel: bool,
}

impl WritingContext {
    /// Create a writing context
    #[must_use]
    pub fn new(info: TableInfoRef, parallel: bool) -> Self {
        WritingContext { info, parallel }
    }

    /// The layout rows are written with
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// Whether rows are serialized on the rayon pool
    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}
