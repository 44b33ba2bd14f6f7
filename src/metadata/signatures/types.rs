//! Signature type model (II.23.2).

use std::fmt;

use crate::metadata::token::Token;

#[allow(non_snake_case)]
/// Element type tags of signature blobs (II.23.1.16)
pub mod ELEMENT_TYPE {
    /// Marks end of a list
    pub const END: u8 = 0x00;
    /// `void`
    pub const VOID: u8 = 0x01;
    /// `bool`
    pub const BOOLEAN: u8 = 0x02;
    /// `char`
    pub const CHAR: u8 = 0x03;
    /// `sbyte`
    pub const I1: u8 = 0x04;
    /// `byte`
    pub const U1: u8 = 0x05;
    /// `short`
    pub const I2: u8 = 0x06;
    /// `ushort`
    pub const U2: u8 = 0x07;
    /// `int`
    pub const I4: u8 = 0x08;
    /// `uint`
    pub const U4: u8 = 0x09;
    /// `long`
    pub const I8: u8 = 0x0a;
    /// `ulong`
    pub const U8: u8 = 0x0b;
    /// `float`
    pub const R4: u8 = 0x0c;
    /// `double`
    pub const R8: u8 = 0x0d;
    /// `string`
    pub const STRING: u8 = 0x0e;
    /// Followed by type
    pub const PTR: u8 = 0x0f;
    /// Followed by type
    pub const BYREF: u8 = 0x10;
    /// Followed by `TypeDefOrRefOrSpecEncoded`
    pub const VALUETYPE: u8 = 0x11;
    /// Followed by `TypeDefOrRefOrSpecEncoded`
    pub const CLASS: u8 = 0x12;
    /// Generic parameter in a generic type definition, followed by its number
    pub const VAR: u8 = 0x13;
    /// Followed by type, rank, sizes and bounds
    pub const ARRAY: u8 = 0x14;
    /// Generic type instantiation, followed by type and type arguments
    pub const GENERICINST: u8 = 0x15;
    /// `System.TypedReference`
    pub const TYPEDBYREF: u8 = 0x16;
    /// `System.IntPtr`
    pub const I: u8 = 0x18;
    /// `System.UIntPtr`
    pub const U: u8 = 0x19;
    /// Followed by a full method signature
    pub const FNPTR: u8 = 0x1b;
    /// `System.Object`
    pub const OBJECT: u8 = 0x1c;
    /// Single-dimensional array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    /// Generic parameter in a generic method definition, followed by its number
    pub const MVAR: u8 = 0x1e;
    /// Required modifier, followed by a `TypeDefOrRefOrSpecEncoded`
    pub const CMOD_REQD: u8 = 0x1f;
    /// Optional modifier, followed by a `TypeDefOrRefOrSpecEncoded`
    pub const CMOD_OPT: u8 = 0x20;
}

/// Leading byte of a field signature
pub const FIELD_SIGNATURE: u8 = 0x06;

/// A custom modifier (`modreq` / `modopt`) applied to a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomModifier {
    /// `modreq` if true, `modopt` otherwise
    pub is_required: bool,
    /// The modifier type, a `TypeDef`, `TypeRef` or `TypeSpec` token
    pub modifier_type: Token,
}

/// Pointer type with its own modifiers
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePointer {
    /// Modifiers between `PTR` and the pointee
    pub modifiers: Vec<CustomModifier>,
    /// The pointee
    pub base: Box<TypeSignature>,
}

/// Single-dimensional, zero-based array
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureSzArray {
    /// Modifiers between `SZARRAY` and the element type
    pub modifiers: Vec<CustomModifier>,
    /// The element type
    pub base: Box<TypeSignature>,
}

/// The type part of a signature
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSignature {
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// System.String
    String,
    /// A pointer to a type
    Ptr(SignaturePointer),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// A value type, by its `TypeDefOrRefOrSpecEncoded` token
    ValueType(Token),
    /// A class, by its `TypeDefOrRefOrSpecEncoded` token
    Class(Token),
    /// Generic parameter of the enclosing type
    GenericParamType(u32),
    /// Generic parameter of the enclosing method
    GenericParamMethod(u32),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// System.TypedReference
    TypedByRef,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.Object
    Object,
    /// Single dimension array
    SzArray(SignatureSzArray),
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Void => write!(f, "System.Void"),
            TypeSignature::Boolean => write!(f, "System.Boolean"),
            TypeSignature::Char => write!(f, "System.Char"),
            TypeSignature::I1 => write!(f, "System.SByte"),
            TypeSignature::U1 => write!(f, "System.Byte"),
            TypeSignature::I2 => write!(f, "System.Int16"),
            TypeSignature::U2 => write!(f, "System.UInt16"),
            TypeSignature::I4 => write!(f, "System.Int32"),
            TypeSignature::U4 => write!(f, "System.UInt32"),
            TypeSignature::I8 => write!(f, "System.Int64"),
            TypeSignature::U8 => write!(f, "System.UInt64"),
            TypeSignature::R4 => write!(f, "System.Single"),
            TypeSignature::R8 => write!(f, "System.Double"),
            TypeSignature::String => write!(f, "System.String"),
            TypeSignature::TypedByRef => write!(f, "System.TypedReference"),
            TypeSignature::I => write!(f, "System.IntPtr"),
            TypeSignature::U => write!(f, "System.UIntPtr"),
            TypeSignature::Object => write!(f, "System.Object"),
            TypeSignature::Ptr(pointer) => write!(f, "{}*", pointer.base),
            TypeSignature::ByRef(base) => write!(f, "{base}&"),
            TypeSignature::SzArray(array) => write!(f, "{}[]", array.base),
            TypeSignature::ValueType(token) | TypeSignature::Class(token) => write!(f, "{token}"),
            TypeSignature::GenericParamType(number) => write!(f, "!{number}"),
            TypeSignature::GenericParamMethod(number) => write!(f, "!!{number}"),
            TypeSignature::GenericInst(base, args) => {
                write!(f, "{base}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
    /// Custom modifiers applied to the field type
    pub modifiers: Vec<CustomModifier>,
    /// The field type
    pub base: TypeSignature,
}

impl SignatureField {
    /// A field of type `base` without modifiers
    #[must_use]
    pub fn new(base: TypeSignature) -> Self {
        SignatureField {
            modifiers: Vec::new(),
            base,
        }
    }
}
