//! The `#Strings` heap (II.24.2.3).
//!
//! A sequence of NUL-terminated UTF-8 strings addressed by byte offset. Offset 0 always holds
//! the empty string.
//!
//! [`Strings`] is the read-only view used to resolve parsed entities, [`StringsBuffer`] the
//! append-only heap that a build pass interns into.
//!
//! # Examples
//!
//! ```rust
//! use cilmeta::metadata::streams::{Strings, StringsBuffer};
//!
//! let mut buffer = StringsBuffer::new(true);
//! let offset = buffer.intern("Value")?;
//! assert_eq!(buffer.intern("Value")?, offset);
//! assert_eq!(buffer.intern("")?, 0);
//!
//! let strings = Strings::from(&buffer.into_bytes())?;
//! assert_eq!(strings.get(offset as usize)?, "Value");
//! # Ok::<(), cilmeta::Error>(())
//! ```

use std::{collections::HashMap, ffi::CStr, str};

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Error::OutOfBounds, Result};

/// Read-only view of a `#Strings` heap
pub struct Strings {
    data: Vec<u8>,
    #[cfg(test)]
    lookups: AtomicUsize,
}

impl Strings {
    /// Create a view over a copy of `data`.
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the empty string.
    pub fn from(data: &[u8]) -> Result<Strings> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #String heap is empty"));
        }

        Ok(Strings {
            data: data.to_vec(),
            #[cfg(test)]
            lookups: AtomicUsize::new(0),
        })
    }

    /// A heap holding only the empty string
    #[must_use]
    pub fn empty() -> Strings {
        Strings {
            data: vec![0],
            #[cfg(test)]
            lookups: AtomicUsize::new(0),
        }
    }

    /// Get the string at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap, or
    /// [`crate::Error::Malformed`] if there is no terminator or the bytes are not UTF-8.
    pub fn get(&self, index: usize) -> Result<&str> {
        #[cfg(test)]
        self.lookups.fetch_add(1, Ordering::Relaxed);

        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds no bytes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw heap bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over `(offset, string)` for every string that starts right after a terminator.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let mut position = 1;
        std::iter::from_fn(move || {
            while position < self.data.len() {
                let start = position;
                let end = self.data[start..]
                    .iter()
                    .position(|byte| *byte == 0)
                    .map_or(self.data.len(), |len| start + len);
                position = end + 1;

                if end > start {
                    if let Ok(value) = str::from_utf8(&self.data[start..end]) {
                        return Some((start, value));
                    }
                }
            }
            None
        })
    }

    #[cfg(test)]
    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

/// Append-only `#Strings` heap used during a build pass.
pub struct StringsBuffer {
    data: Vec<u8>,
    index: HashMap<String, u32>,
    deduplicate: bool,
}

impl StringsBuffer {
    /// An empty heap holding only the empty string at offset 0
    #[must_use]
    pub fn new(deduplicate: bool) -> Self {
        StringsBuffer {
            data: vec![0],
            index: HashMap::new(),
            deduplicate,
        }
    }

    /// A heap starting out with the contents of `source`; all its offsets stay valid.
    #[must_use]
    pub fn seeded(source: &Strings, deduplicate: bool) -> Self {
        let mut index = HashMap::new();
        if deduplicate {
            for (offset, value) in source.iter() {
                if let Ok(offset) = u32::try_from(offset) {
                    index.entry(value.to_string()).or_insert(offset);
                }
            }
        }

        StringsBuffer {
            data: source.data().to_vec(),
            index,
            deduplicate,
        }
    }

    /// Append `value` (or find an identical earlier one) and return its offset.
    ///
    /// The empty string is always offset 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for strings with embedded NUL characters or when
    /// the heap outgrows 32-bit offsets.
    pub fn intern(&mut self, value: &str) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }
        if value.contains('\0') {
            return Err(malformed_error!(
                "String contains an embedded NUL - {:?}",
                value
            ));
        }
        if self.deduplicate {
            if let Some(offset) = self.index.get(value) {
                return Ok(*offset);
            }
        }

        let Ok(offset) = u32::try_from(self.data.len()) else {
            return Err(malformed_error!("#Strings heap exceeds 4GB"));
        };

        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        if self.deduplicate {
            self.index.insert(value.to_string(), offset);
        }

        Ok(offset)
    }

    /// Current size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds no bytes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Finish the heap
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
