//! Headers populated through the mutation helpers.

use crate::metadata::{
    header::MetadataHeader,
    signatures::{SignatureField, TypeSignature},
    tables::{ConstantValue, FieldAttributes, FieldBuilder, TableId, TypeDefBuilder},
    token::Token,
};

/// A fresh image with one class and two fields:
///
/// - `Module` `Sample.dll`
/// - `TypeDef` 1 `<Module>`, `TypeDef` 2 `Sample.Widget`
/// - `Field` 1 `public static literal int32 count = 42` with one custom attribute
/// - `Field` 2 `public string label`
pub fn widget_header() -> MetadataHeader {
    let mut header = MetadataHeader::new();
    header
        .add_module(
            "Sample.dll",
            uguid::guid!("6c1d5ed4-9d2f-4e0c-a3cb-0d6a1c3a8b20"),
        )
        .unwrap();

    header
        .add_type(TypeDefBuilder::new().name("<Module>").build().unwrap())
        .unwrap();
    let widget = header
        .add_type(
            TypeDefBuilder::new()
                .namespace("Sample")
                .name("Widget")
                .build()
                .unwrap(),
        )
        .unwrap();

    let count = header
        .add_field(
            widget,
            FieldBuilder::new()
                .name("count")
                .flags(FieldAttributes::PUBLIC | FieldAttributes::STATIC | FieldAttributes::LITERAL)
                .signature(SignatureField::new(TypeSignature::I4))
                .build()
                .unwrap(),
        )
        .unwrap();
    header.attach_constant(count, ConstantValue::I4(42)).unwrap();
    header
        .attach_custom_attribute(
            count,
            Token::from_parts(TableId::MemberRef, 1),
            vec![0x01, 0x00, 0x00, 0x00],
        )
        .unwrap();

    header
        .add_field(
            widget,
            FieldBuilder::new()
                .name("label")
                .flags(FieldAttributes::PUBLIC)
                .signature(SignatureField::new(TypeSignature::String))
                .build()
                .unwrap(),
        )
        .unwrap();

    header
}
