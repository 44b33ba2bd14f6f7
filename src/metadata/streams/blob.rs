//! The `#Blob` heap (II.24.2.4).
//!
//! Each entry is a compressed length followed by that many bytes. Offset 0 holds the empty
//! blob. Signatures, constant values, marshalling descriptors and custom attribute values all
//! live here.

use std::collections::HashMap;

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    file::parser::Parser, utils::write_compressed_uint, Error::OutOfBounds, Result,
};

/// Read-only view of a `#Blob` heap
pub struct Blob {
    data: Vec<u8>,
    #[cfg(test)]
    lookups: AtomicUsize,
}

impl Blob {
    /// Create a view over a copy of `data`.
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the empty blob.
    pub fn from(data: &[u8]) -> Result<Blob> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob {
            data: data.to_vec(),
            #[cfg(test)]
            lookups: AtomicUsize::new(0),
        })
    }

    /// A heap holding only the empty blob
    #[must_use]
    pub fn empty() -> Blob {
        Blob {
            data: vec![0],
            #[cfg(test)]
            lookups: AtomicUsize::new(0),
        }
    }

    /// Get the blob at `index`, without its length prefix.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the declared length runs past the
    /// heap.
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        #[cfg(test)]
        self.lookups.fetch_add(1, Ordering::Relaxed);

        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(OutOfBounds);
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
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

    /// Iterate over `(offset, blob)` of consecutive entries, starting after the empty blob.
    ///
    /// Stops at the first entry whose length prefix cannot be decoded.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        let mut position = 1;
        std::iter::from_fn(move || {
            if position >= self.data.len() {
                return None;
            }

            let mut parser = Parser::new(&self.data[position..]);
            let len = parser.read_compressed_uint().ok()? as usize;
            let start = position + parser.pos();
            let end = start.checked_add(len)?;
            if end > self.data.len() {
                return None;
            }

            let entry = (position, &self.data[start..end]);
            position = end;
            Some(entry)
        })
    }

    #[cfg(test)]
    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

/// Append-only `#Blob` heap used during a build pass.
pub struct BlobBuffer {
    data: Vec<u8>,
    index: HashMap<Vec<u8>, u32>,
    deduplicate: bool,
}

impl BlobBuffer {
    /// An empty heap holding only the empty blob at offset 0
    #[must_use]
    pub fn new(deduplicate: bool) -> Self {
        BlobBuffer {
            data: vec![0],
            index: HashMap::new(),
            deduplicate,
        }
    }

    /// A heap starting out with the contents of `source`; all its offsets stay valid.
    #[must_use]
    pub fn seeded(source: &Blob, deduplicate: bool) -> Self {
        let mut index = HashMap::new();
        if deduplicate {
            for (offset, value) in source.iter() {
                if value.is_empty() {
                    continue;
                }
                if let Ok(offset) = u32::try_from(offset) {
                    index.entry(value.to_vec()).or_insert(offset);
                }
            }
        }

        BlobBuffer {
            data: source.data().to_vec(),
            index,
            deduplicate,
        }
    }

    /// Append `value` with its length prefix (or find an identical earlier entry) and return
    /// its offset. The empty blob is always offset 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob is too long for a compressed length or
    /// the heap outgrows 32-bit offsets.
    pub fn intern(&mut self, value: &[u8]) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }
        if self.deduplicate {
            if let Some(offset) = self.index.get(value) {
                return Ok(*offset);
            }
        }

        let Ok(offset) = u32::try_from(self.data.len()) else {
            return Err(malformed_error!("#Blob heap exceeds 4GB"));
        };
        let Ok(len) = u32::try_from(value.len()) else {
            return Err(malformed_error!("Blob of {} bytes is too large", value.len()));
        };

        write_compressed_uint(len, &mut self.data)?;
        self.data.extend_from_slice(value);
        if self.deduplicate {
            self.index.insert(value.to_vec(), offset);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 9] = [
            0x00,
            0x03, 0x06, 0x08, 0x01,
            0x02, 0x06, 0x0E,
            0x00,
        ];

        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.get(0).unwrap(), &[] as &[u8]);
        assert_eq!(blob.get(1).unwrap(), &[0x06, 0x08, 0x01]);
        assert_eq!(blob.get(5).unwrap(), &[0x06, 0x0E]);
        assert!(blob.get(9).is_err());

        let entries: Vec<_> = blob.iter().collect();
        assert_eq!(
            entries,
            vec![
                (1, &[0x06, 0x08, 0x01][..]),
                (5, &[0x06, 0x0E][..]),
                (8, &[][..])
            ]
        );
    }

    #[test]
    fn truncated() {
        let blob = Blob::from(&[0x00, 0x05, 0x01, 0x02]).unwrap();
        assert!(matches!(blob.get(1), Err(OutOfBounds)));
        assert!(Blob::from(&[]).is_err());
        assert!(Blob::from(&[0x01]).is_err());
    }

    #[test]
    fn intern() {
        let mut buffer = BlobBuffer::new(true);
        let a = buffer.intern(&[0x06, 0x08]).unwrap();
        assert_eq!(a, 1);
        assert_eq!(buffer.intern(&[0x06, 0x08]).unwrap(), a);
        assert_eq!(buffer.intern(&[]).unwrap(), 0);

        let long = vec![0xAB; 0x80];
        let b = buffer.intern(&long).unwrap();
        assert_eq!(b, 4);
        // two byte length prefix
        assert_eq!(buffer.len(), 4 + 2 + 0x80);

        let blob = Blob::from(&buffer.into_bytes()).unwrap();
        assert_eq!(blob.get(b as usize).unwrap(), long.as_slice());
    }

    #[test]
    fn seeded_keeps_offsets() {
        let source = Blob::from(&[0x00, 0x02, 0x06, 0x08]).unwrap();
        let mut buffer = BlobBuffer::seeded(&source, true);
        assert_eq!(buffer.intern(&[0x06, 0x08]).unwrap(), 1);
        assert_eq!(buffer.intern(&[0x06, 0x09]).unwrap(), 4);
    }
}
