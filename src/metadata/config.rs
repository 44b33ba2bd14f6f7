//! Load and build configuration.
//!
//! Both configurations are plain `Copy` values with a [`Default`] and a handful of named
//! presets. They are passed explicitly to [`crate::metadata::header::MetadataHeader`]; nothing
//! is read from the environment.

/// Options applied while parsing a tables stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Reject heap offsets past the end of their heap and table indices past the end of their
    /// table while reading rows.
    pub validate_indices: bool,

    /// Resolve every deferred binding right after loading.
    ///
    /// Needed before entities are handed to code that must not observe lookup errors later on.
    pub eager_resolution: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            validate_indices: true,
            eager_resolution: false,
        }
    }
}

impl LoadConfig {
    /// Validate indices and resolve everything at load time
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_indices: true,
            eager_resolution: true,
        }
    }

    /// No index validation, nothing resolved until accessed
    #[must_use]
    pub fn lazy() -> Self {
        Self {
            validate_indices: false,
            eager_resolution: false,
        }
    }
}

/// Options applied while rebuilding and writing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BuildConfig {
    /// Intern identical heap values to a single offset.
    pub deduplicate_heaps: bool,

    /// Never narrow a heap index below the width used by the source image.
    ///
    /// With this set an image that is rebuilt without modification is byte-identical to its
    /// source, even if the source used oversized indices.
    pub preserve_index_sizes: bool,

    /// Serialize the rows of large tables on the rayon thread pool.
    pub parallel_write: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            deduplicate_heaps: true,
            preserve_index_sizes: true,
            parallel_write: false,
        }
    }
}

impl BuildConfig {
    /// Smallest output: deduplicated heaps, index widths recomputed from scratch
    #[must_use]
    pub fn compact() -> Self {
        Self {
            deduplicate_heaps: true,
            preserve_index_sizes: false,
            parallel_write: false,
        }
    }

    /// Same layout as [`BuildConfig::default`], rows written in parallel
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel_write: true,
            ..Self::default()
        }
    }
}
