use std::fmt;

use widestring::U16String;

use crate::{
    file::parser::Parser,
    metadata::signatures::ELEMENT_TYPE,
    Result,
};

/// A decoded `Constant` value (II.22.9).
///
/// The element type of the row selects how the blob is read. Strings are UTF-16LE without a
/// terminator; a null object reference is stored as `CLASS` with a 4-byte zero blob.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// `bool`
    Boolean(bool),
    /// UTF-16 code unit
    Char(u16),
    /// `sbyte`
    I1(i8),
    /// `byte`
    U1(u8),
    /// `short`
    I2(i16),
    /// `ushort`
    U2(u16),
    /// `int`
    I4(i32),
    /// `uint`
    U4(u32),
    /// `long`
    I8(i64),
    /// `ulong`
    U8(u64),
    /// `float`
    R4(f32),
    /// `double`
    R8(f64),
    /// `string`
    String(String),
    /// `null` reference
    Null,
}

impl ConstantValue {
    /// The `ELEMENT_TYPE_*` stored in the `Type` column for this value
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            ConstantValue::Boolean(_) => ELEMENT_TYPE::BOOLEAN,
            ConstantValue::Char(_) => ELEMENT_TYPE::CHAR,
            ConstantValue::I1(_) => ELEMENT_TYPE::I1,
            ConstantValue::U1(_) => ELEMENT_TYPE::U1,
            ConstantValue::I2(_) => ELEMENT_TYPE::I2,
            ConstantValue::U2(_) => ELEMENT_TYPE::U2,
            ConstantValue::I4(_) => ELEMENT_TYPE::I4,
            ConstantValue::U4(_) => ELEMENT_TYPE::U4,
            ConstantValue::I8(_) => ELEMENT_TYPE::I8,
            ConstantValue::U8(_) => ELEMENT_TYPE::U8,
            ConstantValue::R4(_) => ELEMENT_TYPE::R4,
            ConstantValue::R8(_) => ELEMENT_TYPE::R8,
            ConstantValue::String(_) => ELEMENT_TYPE::STRING,
            ConstantValue::Null => ELEMENT_TYPE::CLASS,
        }
    }

    /// Decode the blob `data` of a constant whose row says `element_type`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the blob is too short for the type, or
    /// [`crate::Error::Malformed`] for an element type a constant cannot have, trailing bytes,
    /// or a string blob of odd length.
    pub fn decode(element_type: u8, data: &[u8]) -> Result<Self> {
        let mut parser = Parser::new(data);
        let value = match element_type {
            ELEMENT_TYPE::BOOLEAN => ConstantValue::Boolean(parser.read_le::<u8>()? != 0),
            ELEMENT_TYPE::CHAR => ConstantValue::Char(parser.read_le::<u16>()?),
            ELEMENT_TYPE::I1 => ConstantValue::I1(parser.read_le::<i8>()?),
            ELEMENT_TYPE::U1 => ConstantValue::U1(parser.read_le::<u8>()?),
            ELEMENT_TYPE::I2 => ConstantValue::I2(parser.read_le::<i16>()?),
            ELEMENT_TYPE::U2 => ConstantValue::U2(parser.read_le::<u16>()?),
            ELEMENT_TYPE::I4 => ConstantValue::I4(parser.read_le::<i32>()?),
            ELEMENT_TYPE::U4 => ConstantValue::U4(parser.read_le::<u32>()?),
            ELEMENT_TYPE::I8 => ConstantValue::I8(parser.read_le::<i64>()?),
            ELEMENT_TYPE::U8 => ConstantValue::U8(parser.read_le::<u64>()?),
            ELEMENT_TYPE::R4 => ConstantValue::R4(parser.read_le::<f32>()?),
            ELEMENT_TYPE::R8 => ConstantValue::R8(parser.read_le::<f64>()?),
            ELEMENT_TYPE::STRING => {
                if data.len() % 2 != 0 {
                    return Err(malformed_error!(
                        "String constant has odd length - {}",
                        data.len()
                    ));
                }

                let units: Vec<u16> = data
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                return match U16String::from_vec(units).to_string() {
                    Ok(value) => Ok(ConstantValue::String(value)),
                    Err(_) => Err(malformed_error!("String constant is not valid UTF-16")),
                };
            }
            ELEMENT_TYPE::CLASS => {
                if parser.read_le::<u32>()? != 0 {
                    return Err(malformed_error!("Class constant must be a null reference"));
                }
                ConstantValue::Null
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid constant type - 0x{:02x}",
                    element_type
                ))
            }
        };

        if parser.has_more_data() {
            return Err(malformed_error!(
                "Trailing data after constant of type 0x{:02x}",
                element_type
            ));
        }

        Ok(value)
    }

    /// The blob bytes of this value
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ConstantValue::Boolean(value) => vec![u8::from(*value)],
            ConstantValue::Char(value) | ConstantValue::U2(value) => value.to_le_bytes().to_vec(),
            ConstantValue::I1(value) => value.to_le_bytes().to_vec(),
            ConstantValue::U1(value) => vec![*value],
            ConstantValue::I2(value) => value.to_le_bytes().to_vec(),
            ConstantValue::I4(value) => value.to_le_bytes().to_vec(),
            ConstantValue::U4(value) => value.to_le_bytes().to_vec(),
            ConstantValue::I8(value) => value.to_le_bytes().to_vec(),
            ConstantValue::U8(value) => value.to_le_bytes().to_vec(),
            ConstantValue::R4(value) => value.to_le_bytes().to_vec(),
            ConstantValue::R8(value) => value.to_le_bytes().to_vec(),
            ConstantValue::String(value) => U16String::from_str(value)
                .into_vec()
                .iter()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
            ConstantValue::Null => vec![0; 4],
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Boolean(value) => write!(f, "{value}"),
            ConstantValue::Char(value) => match char::from_u32(u32::from(*value)) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{value:04x}'"),
            },
            ConstantValue::I1(value) => write!(f, "{value}"),
            ConstantValue::U1(value) => write!(f, "{value}"),
            ConstantValue::I2(value) => write!(f, "{value}"),
            ConstantValue::U2(value) => write!(f, "{value}"),
            ConstantValue::I4(value) => write!(f, "{value}"),
            ConstantValue::U4(value) => write!(f, "{value}"),
            ConstantValue::I8(value) => write!(f, "{value}"),
            ConstantValue::U8(value) => write!(f, "{value}"),
            ConstantValue::R4(value) => write!(f, "{value}"),
            ConstantValue::R8(value) => write!(f, "{value}"),
            ConstantValue::String(value) => write!(f, "\"{value}\""),
            ConstantValue::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        assert_eq!(
            ConstantValue::decode(ELEMENT_TYPE::I4, &[0x2a, 0x00, 0x00, 0x00]).unwrap(),
            ConstantValue::I4(42)
        );
        assert_eq!(
            ConstantValue::decode(ELEMENT_TYPE::BOOLEAN, &[0x01]).unwrap(),
            ConstantValue::Boolean(true)
        );
        assert_eq!(
            ConstantValue::decode(ELEMENT_TYPE::R8, &1.5f64.to_le_bytes()).unwrap(),
            ConstantValue::R8(1.5)
        );
        assert_eq!(ConstantValue::I2(-2).encode(), vec![0xfe, 0xff]);
        assert_eq!(ConstantValue::I4(42).element_type(), ELEMENT_TYPE::I4);
    }

    #[test]
    fn strings() {
        let value = ConstantValue::String("Hi".to_string());
        let encoded = value.encode();
        assert_eq!(encoded, vec![0x48, 0x00, 0x69, 0x00]);
        assert_eq!(ConstantValue::decode(ELEMENT_TYPE::STRING, &encoded).unwrap(), value);
        assert_eq!(
            ConstantValue::decode(ELEMENT_TYPE::STRING, &[]).unwrap(),
            ConstantValue::String(String::new())
        );
        assert!(ConstantValue::decode(ELEMENT_TYPE::STRING, &[0x48]).is_err());
    }

    #[test]
    fn null_reference() {
        assert_eq!(ConstantValue::Null.encode(), vec![0, 0, 0, 0]);
        assert_eq!(
            ConstantValue::decode(ELEMENT_TYPE::CLASS, &[0, 0, 0, 0]).unwrap(),
            ConstantValue::Null
        );
        assert!(ConstantValue::decode(ELEMENT_TYPE::CLASS, &[1, 0, 0, 0]).is_err());
    }

    #[test]
    fn invalid() {
        assert!(ConstantValue::decode(ELEMENT_TYPE::I4, &[0x01]).is_err());
        assert!(ConstantValue::decode(ELEMENT_TYPE::U1, &[0x01, 0x02]).is_err());
        assert!(ConstantValue::decode(ELEMENT_TYPE::SZARRAY, &[0x01]).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(ConstantValue::I4(-7).to_string(), "-7");
        assert_eq!(ConstantValue::String("x".to_string()).to_string(), "\"x\"");
        assert_eq!(ConstantValue::Char(0x41).to_string(), "'A'");
        assert_eq!(ConstantValue::Null.to_string(), "null");
    }
}
