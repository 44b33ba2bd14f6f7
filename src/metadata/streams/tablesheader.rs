use std::sync::Arc;

use log::debug;
use strum::IntoEnumIterator;

use crate::{
    file::io::{read_le_at, write_le_at},
    metadata::{
        config::LoadConfig,
        context::{BuildingContext, ReadingContext, WritingContext},
        streams::Heaps,
        tables::{
            impl_table_access, Constant, CustomAttribute, Field, FieldMarshal, FieldRva,
            HeapSizes, MetadataEntity, MetadataTable, Module, TableAccess, TableId, TableInfo,
            TableInfoRef, TypeDef, MAX_ROWS, SUPPORTED_TABLES,
        },
    },
    Error::{NotSupported, OutOfBounds},
    Result,
};

/// Size of the fixed part of the `#~` header
const HEADER_SIZE: usize = 24;

/// Sorted mask written by current compilers
const DEFAULT_SORTED: u64 = 0x0000_1600_3301_FA00;

/// The `#~` stream: its header and the entities of every modelled table.
///
/// Tables are stored in [`TableId`] order. Only the tables in [`SUPPORTED_TABLES`] can be
/// present; everything else in the header (version, reserved bytes, sorted mask, unknown
/// `HeapSizes` bits) is kept as read and written back unchanged.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6 && II.22
pub struct TablesStream {
    /// Reserved, shall be 0
    pub reserved: u32,
    /// Major version of table schemata, shall be 2
    pub major_version: u8,
    /// Minor version of table schemata, shall be 0
    pub minor_version: u8,
    /// Reserved, shall be 1
    pub reserved2: u8,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// The `HeapSizes` byte as read; the width bits are recomputed on write
    heap_sizes: u8,
    /// Bit vector of present tables, as read
    valid: u64,
    /// The `Module` table
    pub module: MetadataTable<Module>,
    /// The `TypeDef` table
    pub type_defs: MetadataTable<TypeDef>,
    /// The `Field` table
    pub fields: MetadataTable<Field>,
    /// The `Constant` table
    pub constants: MetadataTable<Constant>,
    /// The `CustomAttribute` table
    pub custom_attributes: MetadataTable<CustomAttribute>,
    /// The `FieldMarshal` table
    pub field_marshals: MetadataTable<FieldMarshal>,
    /// The `FieldRVA` table
    pub field_rvas: MetadataTable<FieldRva>,
}

impl Default for TablesStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TablesStream {
    /// An empty stream with a version 2.0 header
    #[must_use]
    pub fn new() -> Self {
        TablesStream {
            reserved: 0,
            major_version: 2,
            minor_version: 0,
            reserved2: 1,
            sorted: DEFAULT_SORTED,
            heap_sizes: 0,
            valid: 0,
            module: MetadataTable::new(),
            type_defs: MetadataTable::new(),
            fields: MetadataTable::new(),
            constants: MetadataTable::new(),
            custom_attributes: MetadataTable::new(),
            field_marshals: MetadataTable::new(),
            field_rvas: MetadataTable::new(),
        }
    }

    /// Parse a `#~` stream whose heap-backed columns resolve against `heaps`.
    ///
    /// Returns the stream and the layout it was read with.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data, [`crate::Error::Malformed`]
    /// for an invalid header or, with index validation on, an index out of range, and
    /// [`crate::Error::NotSupported`] if a table other than the modelled ones is present.
    pub fn read(
        data: &[u8],
        heaps: &Arc<Heaps>,
        config: LoadConfig,
    ) -> Result<(TablesStream, TableInfoRef)> {
        if data.len() < HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let mut offset = 0;
        let reserved = read_le_at::<u32>(data, &mut offset)?;
        let major_version = read_le_at::<u8>(data, &mut offset)?;
        let minor_version = read_le_at::<u8>(data, &mut offset)?;
        let heap_sizes = read_le_at::<u8>(data, &mut offset)?;
        let reserved2 = read_le_at::<u8>(data, &mut offset)?;
        let valid = read_le_at::<u64>(data, &mut offset)?;
        let sorted = read_le_at::<u64>(data, &mut offset)?;

        let known = TableId::iter().fold(0u64, |mask, table| mask | table.mask());
        if valid & !known != 0 {
            return Err(malformed_error!(
                "Unknown tables in valid mask - {:#018x}",
                valid & !known
            ));
        }

        let mut row_counts = Vec::new();
        for table in TableId::iter().filter(|table| valid & table.mask() != 0) {
            if !SUPPORTED_TABLES.contains(&table) {
                return Err(NotSupported(table));
            }
            let rows = read_le_at::<u32>(data, &mut offset)?;
            if rows as usize > MAX_ROWS {
                return Err(malformed_error!(
                    "Row count of {:?} exceeds the token range - {:#x}",
                    table,
                    rows
                ));
            }
            row_counts.push((table, rows));
        }

        let info = Arc::new(TableInfo::new(
            row_counts.iter().copied(),
            HeapSizes::from_bits_truncate(heap_sizes),
        ));
        let context = ReadingContext::new(info.clone(), heaps.clone(), config);

        let stream = TablesStream {
            reserved,
            major_version,
            minor_version,
            reserved2,
            sorted,
            heap_sizes,
            valid,
            module: MetadataTable::read(data, &mut offset, info.rows(TableId::Module), &context)?,
            type_defs: MetadataTable::read(data, &mut offset, info.rows(TableId::TypeDef), &context)?,
            fields: MetadataTable::read(data, &mut offset, info.rows(TableId::Field), &context)?,
            constants: MetadataTable::read(
                data,
                &mut offset,
                info.rows(TableId::Constant),
                &context,
            )?,
            custom_attributes: MetadataTable::read(
                data,
                &mut offset,
                info.rows(TableId::CustomAttribute),
                &context,
            )?,
            field_marshals: MetadataTable::read(
                data,
                &mut offset,
                info.rows(TableId::FieldMarshal),
                &context,
            )?,
            field_rvas: MetadataTable::read(
                data,
                &mut offset,
                info.rows(TableId::FieldRVA),
                &context,
            )?,
        };

        if config.eager_resolution {
            stream.resolve_all()?;
        }

        debug!(
            "read tables stream v{}.{}: {:?}, {} of {} bytes used",
            major_version,
            minor_version,
            row_counts,
            offset,
            data.len()
        );

        Ok((stream, info))
    }

    /// Resolve every deferred value of every entity.
    ///
    /// # Errors
    /// Returns the first resolution error.
    pub fn resolve_all(&self) -> Result<()> {
        fn resolve<T: MetadataEntity>(table: &MetadataTable<T>) -> Result<()> {
            table.iter().try_for_each(|entity| entity.resolve_all())
        }

        resolve(&self.module)?;
        resolve(&self.type_defs)?;
        resolve(&self.fields)?;
        resolve(&self.constants)?;
        resolve(&self.custom_attributes)?;
        resolve(&self.field_marshals)?;
        resolve(&self.field_rvas)
    }

    /// Number of rows of `table`, 0 for tables that are not modelled
    #[must_use]
    pub fn table_row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::Module => self.module.row_count(),
            TableId::TypeDef => self.type_defs.row_count(),
            TableId::Field => self.fields.row_count(),
            TableId::Constant => self.constants.row_count(),
            TableId::CustomAttribute => self.custom_attributes.row_count(),
            TableId::FieldMarshal => self.field_marshals.row_count(),
            TableId::FieldRVA => self.field_rvas.row_count(),
            _ => 0,
        }
    }

    /// Row count of every table, in [`TableId`] order
    #[must_use]
    pub fn row_counts(&self) -> Vec<(TableId, u32)> {
        SUPPORTED_TABLES
            .iter()
            .map(|table| (*table, self.table_row_count(*table)))
            .collect()
    }

    /// The `valid` mask the stream is written with: tables present in the source plus every
    /// non-empty table
    #[must_use]
    pub fn valid(&self) -> u64 {
        SUPPORTED_TABLES
            .iter()
            .filter(|table| self.table_row_count(**table) > 0)
            .fold(self.valid, |mask, table| mask | table.mask())
    }

    /// Tables that are written, in [`TableId`] order
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        let valid = self.valid();
        TableId::iter().filter(move |table| valid & table.mask() != 0)
    }

    /// The `HeapSizes` byte as it was read
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        HeapSizes::from_bits_truncate(self.heap_sizes)
    }

    /// Recompute the raw rows of every table, in [`TableId`] order.
    ///
    /// # Errors
    /// Returns the first update error.
    pub fn update(&mut self, context: &mut BuildingContext) -> Result<()> {
        self.module.update_members(context)?;
        self.type_defs.update_members(context)?;
        self.fields.update_members(context)?;
        self.constants.update_members(context)?;
        self.custom_attributes.update_members(context)?;
        self.field_marshals.update_members(context)?;
        self.field_rvas.update_members(context)
    }

    /// Serialize the header and every table with the layout `info`.
    ///
    /// # Errors
    /// Returns [`crate::Error::StaleRow`] if an entity changed after the last
    /// [`TablesStream::update`], or an encoding error if a value does not fit its column.
    pub fn write(&self, info: &TableInfoRef, parallel: bool) -> Result<Vec<u8>> {
        let valid = self.valid();
        let present = valid.count_ones() as usize;

        let mut header = vec![0u8; HEADER_SIZE + present * 4];
        let mut offset = 0;
        write_le_at(&mut header, &mut offset, self.reserved)?;
        write_le_at(&mut header, &mut offset, self.major_version)?;
        write_le_at(&mut header, &mut offset, self.minor_version)?;
        write_le_at(
            &mut header,
            &mut offset,
            (self.heap_sizes & !HeapSizes::all().bits()) | info.heap_sizes().bits(),
        )?;
        write_le_at(&mut header, &mut offset, self.reserved2)?;
        write_le_at(&mut header, &mut offset, valid)?;
        write_le_at(&mut header, &mut offset, self.sorted)?;
        for table in self.present_tables() {
            write_le_at(&mut header, &mut offset, info.rows(table))?;
        }

        let context = WritingContext::new(info.clone(), parallel);
        let mut data = header;
        data.extend(self.module.write(&context)?);
        data.extend(self.type_defs.write(&context)?);
        data.extend(self.fields.write(&context)?);
        data.extend(self.constants.write(&context)?);
        data.extend(self.custom_attributes.write(&context)?);
        data.extend(self.field_marshals.write(&context)?);
        data.extend(self.field_rvas.write(&context)?);

        Ok(data)
    }
}

impl_table_access!(Module, module);
impl_table_access!(TypeDef, type_defs);
impl_table_access!(Field, fields);
impl_table_access!(Constant, constants);
impl_table_access!(CustomAttribute, custom_attributes);
impl_table_access!(FieldMarshal, field_marshals);
impl_table_access!(FieldRva, field_rvas);
