//! The update and write passes of a build.

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    metadata::{
        context::BuildingContext,
        header::{BuildPhase, MetadataHeader},
        streams::MetadataStreams,
        tables::{HeapSizes, TableInfo, TableInfoRef},
    },
    Result,
};

/// A header whose raw rows are up to date, ready to be written.
///
/// Holds the header's only mutable borrow: entities cannot change between the update pass that
/// created this handle and [`UpdatedMetadata::write`].
pub struct UpdatedMetadata<'a> {
    header: &'a mut MetadataHeader,
    info: TableInfoRef,
    heaps: MetadataStreams,
}

impl<'a> UpdatedMetadata<'a> {
    /// Run the update pass over every table of `header`
    pub(crate) fn new(header: &'a mut MetadataHeader) -> Result<Self> {
        let config = *header.build_config();
        let source_sizes = header
            .source_info()
            .map_or(HeapSizes::empty(), |info| info.heap_sizes());
        let source_info = header.source_info().cloned();

        let (tables, heaps) = header.parts_mut();
        let mut context = BuildingContext::new(heaps.clone(), config);
        tables.update(&mut context)?;

        let info = Arc::new(TableInfo::new(
            tables.row_counts(),
            context.heap_sizes(source_sizes),
        ));
        if let Some(source) = source_info {
            for change in source.width_changes(&info) {
                warn!("index width changed: {change}");
            }
        }

        let heaps = context.into_streams();
        debug!(
            "updated metadata: {:?}, #Strings {} bytes, #Blob {} bytes, #GUID {} bytes, #US {} bytes, heap sizes {:?}",
            tables.row_counts(),
            heaps.strings.len(),
            heaps.blob.len(),
            heaps.guid.len(),
            heaps.user_strings.len(),
            info.heap_sizes()
        );

        header.set_phase(BuildPhase::Updated);
        Ok(UpdatedMetadata {
            header,
            info,
            heaps,
        })
    }

    /// The layout the streams will be written with
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// The header being written
    #[must_use]
    pub fn header(&self) -> &MetadataHeader {
        &*self.header
    }

    /// Serialize the tables stream and hand out all five streams.
    ///
    /// # Errors
    /// Returns an encoding error if a row cannot be written with the computed layout.
    pub fn write(self) -> Result<MetadataStreams> {
        let parallel = self.header.build_config().parallel_write;
        let tables = self.header.tables().write(&self.info, parallel)?;
        debug!("wrote tables stream: {} bytes", tables.len());

        self.header.set_phase(BuildPhase::Written);
        Ok(MetadataStreams {
            tables,
            ..self.heaps
        })
    }
}
