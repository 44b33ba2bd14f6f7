//! Mutation integration tests.
//!
//! Loaded images are changed through the entity setters and the header helpers, rebuilt, and
//! loaded again to verify the changes persisted.

use cilmeta::{
    metadata::{context::WritingContext, streams::MetadataStreams},
    prelude::*,
};

/// Write a header with one type holding `value`, `name` and an explicit layout field
fn written_image() -> Result<MetadataStreams> {
    let mut header = MetadataHeader::new();
    header.add_module("Mutation.dll", uguid::guid!("9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d"))?;
    let owner = header.add_type(
        TypeDefBuilder::new()
            .namespace("Mutation")
            .name("Record")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::SEQUENTIAL_LAYOUT)
            .build()?,
    )?;
    for (name, signature) in [("value", TypeSignature::I4), ("name", TypeSignature::String)] {
        header.add_field(
            owner,
            FieldBuilder::new()
                .name(name)
                .flags(FieldAttributes::PUBLIC)
                .signature(SignatureField::new(signature))
                .build()?,
        )?;
    }
    header.build()?.write()
}

/// Apply `modify` to a loaded copy of [`written_image`], write it and load the result
fn round_trip<F>(modify: F) -> Result<MetadataHeader>
where
    F: FnOnce(&mut MetadataHeader) -> Result<()>,
{
    let mut header = MetadataHeader::from_streams(&written_image()?, LoadConfig::default())?;
    modify(&mut header)?;
    assert_eq!(header.phase(), BuildPhase::Mutated);

    let streams = header.build()?.write()?;
    MetadataHeader::from_streams(&streams, LoadConfig::strict())
}

#[test]
fn rename_field() -> Result<()> {
    let header = round_trip(|header| {
        header.tables_mut().fields.get_mut(1).unwrap().set_name("amount");
        Ok(())
    })?;

    let tables = header.tables();
    assert_eq!(tables.fields.get(1).unwrap().name()?, "amount");
    assert_eq!(tables.fields.get(2).unwrap().name()?, "name");
    assert_eq!(
        tables.fields.get(1).unwrap().full_name(tables)?,
        "System.Int32 Mutation.Record::amount"
    );
    Ok(())
}

#[test]
fn change_signature_and_flags() -> Result<()> {
    let header = round_trip(|header| {
        let field = header.table_mut::<Field>().get_mut(2).unwrap();
        field.set_signature(SignatureField::new(TypeSignature::SzArray(
            cilmeta::metadata::signatures::SignatureSzArray {
                modifiers: Vec::new(),
                base: Box::new(TypeSignature::U1),
            },
        )));
        field.set_private(true);
        field.set_init_only(true);
        Ok(())
    })?;

    let field = header.tables().fields.get(2).unwrap();
    assert!(field.is_private());
    assert!(!field.is_public());
    assert!(field.is_init_only());
    assert_eq!(field.full_name(header.tables())?, "System.Byte[] Mutation.Record::name");
    Ok(())
}

#[test]
fn attach_to_loaded_field() -> Result<()> {
    let value = Token::from_parts(TableId::Field, 1);
    let header = round_trip(|header| {
        header.attach_constant(value, ConstantValue::I4(-1))?;
        Ok(())
    })?;

    let tables = header.tables();
    let field = tables.fields.get_token(value).unwrap();
    assert!(field.has_default());
    assert_eq!(field.constant(tables).unwrap().value()?, &ConstantValue::I4(-1));
    assert!(tables.fields.get(2).unwrap().constant(tables).is_none());
    Ok(())
}

#[test]
fn append_type_to_loaded_image() -> Result<()> {
    let header = round_trip(|header| {
        let extra = header.add_type(TypeDefBuilder::new().namespace("Mutation").name("Extra").build()?)?;
        header.add_field(
            extra,
            FieldBuilder::new()
                .name("flag")
                .signature(SignatureField::new(TypeSignature::Boolean))
                .build()?,
        )?;
        Ok(())
    })?;

    let tables = header.tables();
    let record = tables.type_defs.get(1).unwrap();
    let extra = tables.type_defs.get(2).unwrap();
    assert_eq!(record.fields(tables).count(), 2);
    assert_eq!(extra.fields(tables).next().unwrap().name()?, "flag");
    assert!(record.is_sequential_layout());
    Ok(())
}

#[test]
fn stale_rows_are_not_written() -> Result<()> {
    let mut header = MetadataHeader::from_streams(&written_image()?, LoadConfig::default())?;
    let info = header.build()?.info().clone();

    header.tables_mut().fields.get_mut(2).unwrap().set_name("renamed");
    let context = WritingContext::new(info, false);
    let stale = header.tables().fields.write(&context);
    assert!(matches!(stale, Err(Error::StaleRow(token)) if token == Token::from_parts(TableId::Field, 2)));

    // a new build refreshes the row
    let streams = header.build()?.write()?;
    let reloaded = MetadataHeader::from_streams(&streams, LoadConfig::default())?;
    assert_eq!(reloaded.tables().fields.get(2).unwrap().name()?, "renamed");
    Ok(())
}

#[test]
fn builders_reject_missing_values() {
    assert!(matches!(
        FieldBuilder::new().signature(SignatureField::new(TypeSignature::I4)).build(),
        Err(Error::ModificationInvalid(_))
    ));
    assert!(matches!(
        FieldBuilder::new().name("x").build(),
        Err(Error::ModificationInvalid(_))
    ));
    assert!(matches!(
        ConstantBuilder::new().value(ConstantValue::I4(1)).build(),
        Err(Error::ModificationInvalid(_))
    ));
}

#[test]
fn corrupted_streams_are_rejected() -> Result<()> {
    let mut streams = written_image()?;
    streams.tables.truncate(streams.tables.len() - 3);
    assert!(matches!(
        MetadataHeader::from_streams(&streams, LoadConfig::default()),
        Err(Error::OutOfBounds)
    ));

    let mut streams = written_image()?;
    // point the first field's name past the end of #Strings
    let field_row = streams.tables.len() - 12;
    streams.tables[field_row + 2] = 0xFF;
    streams.tables[field_row + 3] = 0x7F;
    assert!(matches!(
        MetadataHeader::from_streams(&streams, LoadConfig::default()),
        Err(Error::Malformed { .. })
    ));
    assert!(MetadataHeader::from_streams(&streams, LoadConfig::lazy()).is_ok());
    Ok(())
}

#[test]
fn inflated_row_counts_are_rejected() -> Result<()> {
    // row counts follow the 24-byte header: Module, TypeDef, Field
    let mut streams = written_image()?;
    streams.tables[32..36].copy_from_slice(&0x00FF_FFFFu32.to_le_bytes());
    assert!(matches!(
        MetadataHeader::from_streams(&streams, LoadConfig::lazy()),
        Err(Error::OutOfBounds)
    ));

    streams.tables[32..36].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        MetadataHeader::from_streams(&streams, LoadConfig::lazy()),
        Err(Error::Malformed { .. })
    ));
    Ok(())
}

#[test]
fn field_lists_past_the_end_are_clamped() -> Result<()> {
    let mut header = MetadataHeader::from_streams(&written_image()?, LoadConfig::default())?;
    let extra = header.add_type(TypeDefBuilder::new().namespace("Mutation").name("Extra").build()?)?;
    header
        .tables_mut()
        .type_defs
        .get_token_mut(extra)
        .unwrap()
        .set_field_list(0xFFFF);
    let streams = header.build()?.write()?;

    assert!(matches!(
        MetadataHeader::from_streams(&streams, LoadConfig::strict()),
        Err(Error::Malformed { .. })
    ));

    let loaded = MetadataHeader::from_streams(&streams, LoadConfig::lazy())?;
    let tables = loaded.tables();
    let record = tables.type_defs.get(1).unwrap();
    assert_eq!(record.field_range(tables), 1..3);
    assert_eq!(record.fields(tables).count(), 2);
    assert_eq!(tables.type_defs.get(2).unwrap().fields(tables).count(), 0);
    for field in tables.fields.iter() {
        assert_eq!(field.declaring_type(tables).unwrap().name()?, "Record");
    }
    Ok(())
}
