use crate::Result;

/// Largest value representable as an ECMA-335 compressed unsigned integer
const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Append `value` to `buffer` using the compressed unsigned integer encoding of II.23.2.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `value` exceeds `0x1FFF_FFFF`.
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    if value < 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        buffer.push(value as u8);
    } else if value < 0x4000 {
        #[allow(clippy::cast_possible_truncation)]
        buffer.extend_from_slice(&[0x80 | (value >> 8) as u8, value as u8]);
    } else if value <= MAX_COMPRESSED_UINT {
        #[allow(clippy::cast_possible_truncation)]
        buffer.extend_from_slice(&[
            0xC0 | (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]);
    } else {
        return Err(malformed_error!(
            "Value {:#x} is too large for a compressed integer",
            value
        ));
    }

    Ok(())
}
