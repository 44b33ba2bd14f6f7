//! The `#US` heap (II.24.2.4): string literals used by `ldstr`.
//!
//! Entries are laid out like blobs. The payload is UTF-16LE followed by one terminal byte which
//! is 1 if any character needs special handling beyond 8-bit ASCII.

use std::collections::HashMap;

use widestring::U16String;

use crate::{file::parser::Parser, utils::write_compressed_uint, Error::OutOfBounds, Result};

/// Read-only view of a `#US` heap
pub struct UserStrings {
    data: Vec<u8>,
}

impl UserStrings {
    /// Create a view over a copy of `data`.
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the empty entry.
    pub fn from(data: &[u8]) -> Result<UserStrings> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #US heap"));
        }

        Ok(UserStrings {
            data: data.to_vec(),
        })
    }

    /// A heap holding only the empty entry
    #[must_use]
    pub fn empty() -> UserStrings {
        UserStrings { data: vec![0] }
    }

    /// Decode the string at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry runs past the heap, or
    /// [`crate::Error::Malformed`] for an even length or invalid UTF-16.
    pub fn get(&self, index: usize) -> Result<String> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        if len % 2 == 0 {
            return Err(malformed_error!(
                "Invalid string data length at index - {}",
                index
            ));
        }

        let bytes = parser.read_bytes(len - 1)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        match U16String::from_vec(units).to_string() {
            Ok(value) => Ok(value),
            Err(_) => Err(malformed_error!("Invalid string from index - {}", index)),
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
}

/// Append-only `#US` heap used during a build pass.
pub struct UserStringsBuffer {
    data: Vec<u8>,
    index: HashMap<String, u32>,
    deduplicate: bool,
}

impl UserStringsBuffer {
    /// An empty heap holding only the empty entry at offset 0
    #[must_use]
    pub fn new(deduplicate: bool) -> Self {
        UserStringsBuffer {
            data: vec![0],
            index: HashMap::new(),
            deduplicate,
        }
    }

    /// A heap starting out with the contents of `source`; all its offsets stay valid.
    ///
    /// Existing entries are not indexed for deduplication, only new ones are.
    #[must_use]
    pub fn seeded(source: &UserStrings, deduplicate: bool) -> Self {
        UserStringsBuffer {
            data: source.data().to_vec(),
            index: HashMap::new(),
            deduplicate,
        }
    }

    /// Append `value` and return its offset. The empty string is offset 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the string is too long for a compressed length or
    /// the heap outgrows 32-bit offsets.
    pub fn intern(&mut self, value: &str) -> Result<u32> {
        if value.is_empty() {
            return Ok(0);
        }
        if self.deduplicate {
            if let Some(offset) = self.index.get(value) {
                return Ok(*offset);
            }
        }

        let Ok(offset) = u32::try_from(self.data.len()) else {
            return Err(malformed_error!("#US heap exceeds 4GB"));
        };

        let units = U16String::from_str(value).into_vec();
        let Ok(len) = u32::try_from(units.len() * 2 + 1) else {
            return Err(malformed_error!("User string is too large"));
        };

        write_compressed_uint(len, &mut self.data)?;
        for unit in &units {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        self.data.push(u8::from(units.iter().any(|unit| needs_special_handling(*unit))));

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

/// Characters that set the terminal byte (II.24.2.4)
fn needs_special_handling(unit: u16) -> bool {
    unit > 0x7F
        || matches!(unit, 0x01..=0x08 | 0x0E..=0x1F | 0x27 | 0x2D | 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 29] = [
            0x00,
            0x1b, 0x48, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x2c, 0x00, 0x20, 0x00,
            0x57, 0x00, 0x6f, 0x00, 0x72, 0x00, 0x6c, 0x00, 0x64, 0x00, 0x21, 0x00, 0x00,
        ];

        let us_str = UserStrings::from(&data).unwrap();
        assert_eq!(us_str.get(1).unwrap(), "Hello, World!");
        assert_eq!(us_str.get(0).unwrap(), "");
    }

    #[test]
    fn invalid() {
        assert!(UserStrings::from(&[]).is_err());
        assert!(UserStrings::from(&[0x22, 0x1b]).is_err());

        let us_str = UserStrings::from(&[0x00, 0x05, 0xCC, 0xCC]).unwrap();
        assert!(us_str.get(1).is_err());

        let even = UserStrings::from(&[0x00, 0x02, 0x41, 0x00]).unwrap();
        assert!(even.get(1).is_err());
    }

    #[test]
    fn intern() {
        let mut buffer = UserStringsBuffer::new(true);
        let plain = buffer.intern("Hi").unwrap();
        let special = buffer.intern("it's").unwrap();
        assert_eq!(plain, 1);
        assert_eq!(buffer.intern("Hi").unwrap(), plain);

        let bytes = buffer.into_bytes();
        assert_eq!(&bytes[1..7], &[0x05, 0x48, 0x00, 0x69, 0x00, 0x00]);
        // the apostrophe sets the terminal byte
        assert_eq!(bytes[bytes.len() - 1], 1);

        let heap = UserStrings::from(&bytes).unwrap();
        assert_eq!(heap.get(plain as usize).unwrap(), "Hi");
        assert_eq!(heap.get(special as usize).unwrap(), "it's");

        let mut seeded = UserStringsBuffer::seeded(&heap, true);
        assert_eq!(seeded.intern("New").unwrap() as usize, bytes.len());
    }
}
