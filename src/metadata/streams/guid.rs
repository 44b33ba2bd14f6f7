//! The `#GUID` heap (II.24.2.5): a plain array of 16-byte GUIDs addressed by a 1-based index.
//! Index 0 means "no GUID".

use std::collections::HashMap;

use crate::{Error::OutOfBounds, Result};

/// Read-only view of a `#GUID` heap
pub struct Guid {
    data: Vec<u8>,
}

impl Guid {
    /// Create a view over a copy of `data`.
    ///
    /// # Errors
    /// Returns an error if the length is not a multiple of 16.
    pub fn from(data: &[u8]) -> Result<Guid> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "Size of #Guid heap is not a multiple of 16 - {}",
                data.len()
            ));
        }

        Ok(Guid {
            data: data.to_vec(),
        })
    }

    /// A heap without any GUIDs
    #[must_use]
    pub fn empty() -> Guid {
        Guid { data: Vec::new() }
    }

    /// Get the GUID at the 1-based `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for index 0 or an index past the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index < 1 || index * 16 > self.data.len() {
            return Err(OutOfBounds);
        }

        let offset_start = (index - 1) * 16;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[offset_start..offset_start + 16]);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds no GUIDs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw heap bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Append-only `#GUID` heap used during a build pass.
pub struct GuidBuffer {
    data: Vec<u8>,
    index: HashMap<[u8; 16], u32>,
    deduplicate: bool,
}

impl GuidBuffer {
    /// An empty heap
    #[must_use]
    pub fn new(deduplicate: bool) -> Self {
        GuidBuffer {
            data: Vec::new(),
            index: HashMap::new(),
            deduplicate,
        }
    }

    /// A heap starting out with the contents of `source`; all its indices stay valid.
    #[must_use]
    pub fn seeded(source: &Guid, deduplicate: bool) -> Self {
        let mut index = HashMap::new();
        if deduplicate {
            for (position, chunk) in source.data().chunks_exact(16).enumerate() {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(chunk);
                if let Ok(position) = u32::try_from(position + 1) {
                    index.entry(bytes).or_insert(position);
                }
            }
        }

        GuidBuffer {
            data: source.data().to_vec(),
            index,
            deduplicate,
        }
    }

    /// Append `value` (or find an identical earlier one) and return its 1-based index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the heap outgrows 32-bit indices.
    pub fn intern(&mut self, value: &uguid::Guid) -> Result<u32> {
        let bytes = value.to_bytes();
        if self.deduplicate {
            if let Some(index) = self.index.get(&bytes) {
                return Ok(*index);
            }
        }

        let Ok(index) = u32::try_from(self.data.len() / 16 + 1) else {
            return Err(malformed_error!("#GUID heap exceeds 4G entries"));
        };

        self.data.extend_from_slice(&bytes);
        if self.deduplicate {
            self.index.insert(bytes, index);
        }

        Ok(index)
    }

    /// Current size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds no GUIDs
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
