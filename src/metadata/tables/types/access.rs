use crate::metadata::tables::{MetadataEntity, MetadataTable};

/// Typed access to one table of a container, selected by its entity type.
///
/// ```rust
/// use cilmeta::prelude::*;
///
/// let header = MetadataHeader::new();
/// let fields: &MetadataTable<Field> = header.tables().table();
/// assert!(fields.is_empty());
/// ```
pub trait TableAccess<T: MetadataEntity> {
    /// The table holding entities of type `T`
    fn table(&self) -> &MetadataTable<T>;

    /// The table holding entities of type `T`, mutably
    fn table_mut(&mut self) -> &mut MetadataTable<T>;
}

/// Implement [`TableAccess`] for an entity type stored in a named field of `TablesStream`.
macro_rules! impl_table_access {
    ($entity:ty, $field:ident) => {
        impl TableAccess<$entity> for TablesStream {
            fn table(&self) -> &MetadataTable<$entity> {
                &self.$field
            }

            fn table_mut(&mut self) -> &mut MetadataTable<$entity> {
                &mut self.$field
            }
        }
    };
}

pub(crate) use impl_table_access;
