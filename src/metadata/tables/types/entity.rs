use crate::{
    metadata::{
        context::{BuildingContext, ReadingContext},
        tables::{RowReadable, RowWritable, TableId},
        token::Token,
    },
    Result,
};

/// The contract between a [`crate::metadata::tables::MetadataTable`] and the entities it owns.
///
/// An entity is the user-facing view of one row. It is created from its raw row while reading
/// (`from_raw`), projects its current state back into the raw row while building
/// (`update_raw`), and exposes that row for writing (`raw`).
pub trait MetadataEntity: Sized {
    /// The raw row type of this table
    type Raw: RowReadable + RowWritable + Sync;

    /// The table this entity type lives in
    const TABLE_ID: TableId;

    /// Wrap a freshly read row. Heap-backed columns stay unresolved.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if index validation is enabled and a column points
    /// outside its heap or table.
    fn from_raw(raw: Self::Raw, context: &ReadingContext) -> Result<Self>;

    /// Recompute every column of the raw row from the current entity state, interning
    /// heap-backed values into `context`. Clears the dirty flag.
    ///
    /// # Errors
    /// Returns an error if an unresolved value cannot be resolved or a value cannot be encoded.
    fn update_raw(&mut self, context: &mut BuildingContext) -> Result<()>;

    /// The raw row as of the last read or update
    fn raw(&self) -> &Self::Raw;

    /// The token of this entity, row 0 until it is inserted into a table
    fn token(&self) -> Token;

    /// Called by the owning table when the entity is inserted
    fn assign_token(&mut self, token: Token);

    /// Returns true if the entity changed since its raw row was last computed
    fn is_dirty(&self) -> bool;

    /// Resolve every deferred value now.
    ///
    /// # Errors
    /// Returns the first resolution error.
    fn resolve_all(&self) -> Result<()> {
        Ok(())
    }
}

/// Resolution of an entity to the definition it stands for.
///
/// Definition entities resolve to themselves; a reference entity would resolve to a definition
/// elsewhere.
pub trait Resolvable {
    /// The definition type this entity resolves to
    type Definition;

    /// The definition this entity stands for, if it is known
    fn resolve(&self) -> Option<&Self::Definition>;
}
