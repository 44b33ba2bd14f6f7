use crate::{
    metadata::{
        signatures::{CustomModifier, SignatureField, TypeSignature, ELEMENT_TYPE, FIELD_SIGNATURE},
        tables::{CodedIndex, CodedIndexType},
        token::Token,
    },
    utils::write_compressed_uint,
    Result,
};

/// Encode a field signature into its blob form.
///
/// # Errors
/// Returns an error if a type token is not a `TypeDef`, `TypeRef` or `TypeSpec`, or a value is
/// too large for a compressed integer.
pub fn encode_field_signature(signature: &SignatureField) -> Result<Vec<u8>> {
    let mut buffer = vec![FIELD_SIGNATURE];

    encode_custom_modifiers(&signature.modifiers, &mut buffer)?;
    encode_type_signature(&signature.base, &mut buffer)?;

    Ok(buffer)
}

fn encode_type_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let encoded = CodedIndex::try_from(token)?.encode(CodedIndexType::TypeDefOrRef)?;
    write_compressed_uint(encoded, buffer)
}

fn encode_custom_modifiers(modifiers: &[CustomModifier], buffer: &mut Vec<u8>) -> Result<()> {
    for modifier in modifiers {
        buffer.push(if modifier.is_required {
            ELEMENT_TYPE::CMOD_REQD
        } else {
            ELEMENT_TYPE::CMOD_OPT
        });
        encode_type_token(modifier.modifier_type, buffer)?;
    }
    Ok(())
}

fn encode_type_signature(signature: &TypeSignature, buffer: &mut Vec<u8>) -> Result<()> {
    match signature {
        TypeSignature::Void => buffer.push(ELEMENT_TYPE::VOID),
        TypeSignature::Boolean => buffer.push(ELEMENT_TYPE::BOOLEAN),
        TypeSignature::Char => buffer.push(ELEMENT_TYPE::CHAR),
        TypeSignature::I1 => buffer.push(ELEMENT_TYPE::I1),
        TypeSignature::U1 => buffer.push(ELEMENT_TYPE::U1),
        TypeSignature::I2 => buffer.push(ELEMENT_TYPE::I2),
        TypeSignature::U2 => buffer.push(ELEMENT_TYPE::U2),
        TypeSignature::I4 => buffer.push(ELEMENT_TYPE::I4),
        TypeSignature::U4 => buffer.push(ELEMENT_TYPE::U4),
        TypeSignature::I8 => buffer.push(ELEMENT_TYPE::I8),
        TypeSignature::U8 => buffer.push(ELEMENT_TYPE::U8),
        TypeSignature::R4 => buffer.push(ELEMENT_TYPE::R4),
        TypeSignature::R8 => buffer.push(ELEMENT_TYPE::R8),
        TypeSignature::String => buffer.push(ELEMENT_TYPE::STRING),
        TypeSignature::TypedByRef => buffer.push(ELEMENT_TYPE::TYPEDBYREF),
        TypeSignature::I => buffer.push(ELEMENT_TYPE::I),
        TypeSignature::U => buffer.push(ELEMENT_TYPE::U),
        TypeSignature::Object => buffer.push(ELEMENT_TYPE::OBJECT),
        TypeSignature::Ptr(pointer) => {
            buffer.push(ELEMENT_TYPE::PTR);
            encode_custom_modifiers(&pointer.modifiers, buffer)?;
            encode_type_signature(&pointer.base, buffer)?;
        }
        TypeSignature::ByRef(base) => {
            buffer.push(ELEMENT_TYPE::BYREF);
            encode_type_signature(base, buffer)?;
        }
        TypeSignature::SzArray(array) => {
            buffer.push(ELEMENT_TYPE::SZARRAY);
            encode_custom_modifiers(&array.modifiers, buffer)?;
            encode_type_signature(&array.base, buffer)?;
        }
        TypeSignature::ValueType(token) => {
            buffer.push(ELEMENT_TYPE::VALUETYPE);
            encode_type_token(*token, buffer)?;
        }
        TypeSignature::Class(token) => {
            buffer.push(ELEMENT_TYPE::CLASS);
            encode_type_token(*token, buffer)?;
        }
        TypeSignature::GenericParamType(number) => {
            buffer.push(ELEMENT_TYPE::VAR);
            write_compressed_uint(*number, buffer)?;
        }
        TypeSignature::GenericParamMethod(number) => {
            buffer.push(ELEMENT_TYPE::MVAR);
            write_compressed_uint(*number, buffer)?;
        }
        TypeSignature::GenericInst(base, args) => {
            if !matches!(**base, TypeSignature::Class(_) | TypeSignature::ValueType(_)) {
                return Err(malformed_error!(
                    "GENERICINST base must be a class or value type - {}",
                    base
                ));
            }

            buffer.push(ELEMENT_TYPE::GENERICINST);
            encode_type_signature(base, buffer)?;
            let Ok(count) = u32::try_from(args.len()) else {
                return Err(malformed_error!("Too many generic arguments"));
            };
            write_compressed_uint(count, buffer)?;
            for arg in args {
                encode_type_signature(arg, buffer)?;
            }
        }
    }

    Ok(())
}
