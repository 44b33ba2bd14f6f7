//! The owned, ordered rows of one metadata table.
//!
//! A [`MetadataTable`] exclusively owns its entities in row order. Row `n` (1-based) of the
//! table carries the token `(T::TABLE_ID, n)`. The table drives the three passes over its
//! entities:
//!
//! - [`MetadataTable::read`] / [`MetadataTable::read_member`]: bytes to entities
//! - [`MetadataTable::update_members`] / [`MetadataTable::update_member`]: entity state to raw
//!   rows, interning heap values
//! - [`MetadataTable::write`] / [`MetadataTable::write_member`]: raw rows to bytes
//!
//! Cross-table relations are discovered with [`MetadataTable::find_first`] and
//! [`MetadataTable::find_all`], which scan the rows in order.

use log::trace;
use rayon::prelude::*;

use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext, WritingContext},
        tables::{MetadataEntity, RowReadable, RowWritable, TableInfoRef},
        token::Token,
    },
    Error, Result,
};

/// Tables with fewer rows are always written sequentially
const PARALLEL_WRITE_THRESHOLD: usize = 1024;

/// Largest row index a token can address
pub(crate) const MAX_ROWS: usize = 0x00FF_FFFF;

/// The entities of one table, in row order.
pub struct MetadataTable<T> {
    rows: Vec<T>,
}

impl<T> Default for MetadataTable<T> {
    fn default() -> Self {
        MetadataTable { rows: Vec::new() }
    }
}

impl<T: MetadataEntity> MetadataTable<T> {
    /// An empty table
    #[must_use]
    pub fn new() -> Self {
        MetadataTable { rows: Vec::new() }
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows as it appears in the tables stream header
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn row_count(&self) -> u32 {
        // push() keeps the length below 2^24
        self.rows.len() as u32
    }

    /// The entity at the 1-based row `rid`
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        let index = rid.checked_sub(1)?;
        self.rows.get(index as usize)
    }

    /// The entity at the 1-based row `rid`, mutably
    pub fn get_mut(&mut self, rid: u32) -> Option<&mut T> {
        let index = rid.checked_sub(1)?;
        self.rows.get_mut(index as usize)
    }

    /// The entity a token points at, `None` if the token belongs to another table
    #[must_use]
    pub fn get_token(&self, token: Token) -> Option<&T> {
        if token.table_id() != Some(T::TABLE_ID) {
            return None;
        }
        self.get(token.row())
    }

    /// The entity a token points at, mutably
    pub fn get_token_mut(&mut self, token: Token) -> Option<&mut T> {
        if token.table_id() != Some(T::TABLE_ID) {
            return None;
        }
        self.get_mut(token.row())
    }

    /// Iterate over the entities in row order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Iterate mutably over the entities in row order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.rows.iter_mut()
    }

    /// Append `entity` as the new last row and return the token it was assigned.
    ///
    /// # Errors
    /// Returns [`crate::Error::ModificationInvalid`] if the table is full.
    pub fn push(&mut self, mut entity: T) -> Result<Token> {
        if self.rows.len() >= MAX_ROWS {
            return Err(Error::ModificationInvalid(format!(
                "Table {:?} is full",
                T::TABLE_ID
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let token = Token::from_parts(T::TABLE_ID, self.rows.len() as u32 + 1);
        entity.assign_token(token);
        self.rows.push(entity);

        Ok(token)
    }

    /// The first entity, in row order, matching `predicate`
    pub fn find_first<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.rows.iter().find(|entity| predicate(entity))
    }

    /// All entities, in row order, matching `predicate`
    pub fn find_all<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a T> + 'a
    where
        P: FnMut(&T) -> bool + 'a,
    {
        self.rows.iter().filter(move |entity| predicate(entity))
    }

    /// Size of one row under the layout `info`
    #[must_use]
    pub fn row_size(info: &TableInfoRef) -> u32 {
        T::Raw::row_size(info)
    }

    /// Size of the whole table under the layout `info`
    #[must_use]
    pub fn size(&self, info: &TableInfoRef) -> u64 {
        u64::from(Self::row_size(info)) * self.rows.len() as u64
    }

    /// Read one row at `offset` and wrap it in an entity.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than a row's worth of bytes remain, or
    /// the entity's validation error.
    pub fn read_member(
        token: Token,
        data: &[u8],
        offset: &mut usize,
        context: &ReadingContext,
    ) -> Result<T> {
        let start = *offset;
        let raw = T::Raw::row_read(data, offset, token.row(), context.info())?;
        debug_assert_eq!(*offset - start, Self::row_size(context.info()) as usize);

        T::from_raw(raw, context)
    }

    /// Read `rows` consecutive rows starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` cannot hold `rows` rows, or the first
    /// error of [`MetadataTable::read_member`].
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        rows: u32,
        context: &ReadingContext,
    ) -> Result<Self> {
        trace!(
            "reading {} rows of {:?} ({} bytes each)",
            rows,
            T::TABLE_ID,
            Self::row_size(context.info())
        );

        let needed = u64::from(rows) * u64::from(Self::row_size(context.info()));
        if needed > data.len().saturating_sub(*offset) as u64 {
            return Err(Error::OutOfBounds);
        }

        let mut table = MetadataTable {
            rows: Vec::with_capacity(rows as usize),
        };
        for rid in 1..=rows {
            let token = Token::from_parts(T::TABLE_ID, rid);
            table.rows.push(Self::read_member(token, data, offset, context)?);
        }

        Ok(table)
    }

    /// Recompute the raw row of `entity` from its current state.
    ///
    /// # Errors
    /// Returns the entity's update error.
    pub fn update_member(context: &mut BuildingContext, entity: &mut T) -> Result<()> {
        entity.update_raw(context)
    }

    /// Recompute the raw rows of every entity.
    ///
    /// # Errors
    /// Returns the first update error.
    pub fn update_members(&mut self, context: &mut BuildingContext) -> Result<()> {
        trace!("updating {} rows of {:?}", self.rows.len(), T::TABLE_ID);

        for entity in &mut self.rows {
            Self::update_member(context, entity)?;
        }
        Ok(())
    }

    /// Serialize the raw row of `entity` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::StaleRow`] if the entity changed after its last update, or the
    /// row encoding error.
    pub fn write_member(
        entity: &T,
        data: &mut [u8],
        offset: &mut usize,
        info: &TableInfoRef,
    ) -> Result<()> {
        if entity.is_dirty() {
            return Err(Error::StaleRow(entity.token()));
        }

        entity.raw().row_write(data, offset, info)
    }

    /// Serialize every row of the table.
    ///
    /// # Errors
    /// Returns the first error of [`MetadataTable::write_member`].
    pub fn write(&self, context: &WritingContext) -> Result<Vec<u8>> {
        let row_size = Self::row_size(context.info()) as usize;
        let mut data = vec![0u8; row_size * self.rows.len()];

        if context.parallel() && self.rows.len() >= PARALLEL_WRITE_THRESHOLD {
            trace!("writing {} rows of {:?} in parallel", self.rows.len(), T::TABLE_ID);

            if let Some(stale) = self.rows.iter().find(|entity| entity.is_dirty()) {
                return Err(Error::StaleRow(stale.token()));
            }

            let raws: Vec<&T::Raw> = self.rows.iter().map(|entity| entity.raw()).collect();
            let info = context.info();
            data.par_chunks_mut(row_size)
                .zip(raws.par_iter())
                .try_for_each(|(chunk, raw)| {
                    let mut offset = 0;
                    raw.row_write(chunk, &mut offset, info)
                })?;
        } else {
            let mut offset = 0;
            for entity in &self.rows {
                Self::write_member(entity, &mut data, &mut offset, context.info())?;
            }
        }

        Ok(data)
    }
}

impl<'a, T: MetadataEntity> IntoIterator for &'a MetadataTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
