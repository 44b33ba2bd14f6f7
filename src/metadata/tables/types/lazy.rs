//! Deferred bindings and cached back-references.
//!
//! Parsed entities do not decode their heap-backed columns up front. Each such column is a
//! [`LazyValue`]: it starts out holding only the source heap offset and turns into the decoded
//! value on first access, exactly once. Entities created by the user start out resolved and
//! carry no offset at all.
//!
//! Relations that are not stored in an entity's own row (the constant attached to a field, the
//! type declaring it) are discovered by scanning a sibling table. [`BackRef`] memoizes the
//! outcome of that scan, including the outcome "nothing found".
//!
//! Both use [`std::cell::OnceCell`], so an entity with unresolved bindings cannot be shared
//! between threads.

use std::cell::OnceCell;

use crate::{metadata::token::Token, Result};

/// A heap-backed column value that is resolved on first access.
///
/// States: unresolved with a source offset, resolved with a source offset (parsed, read,
/// untouched), or resolved without one (fresh or overwritten). Only the last kind needs to be
/// interned again at build time.
#[derive(Clone, Debug)]
pub struct LazyValue<T> {
    source: Option<u32>,
    value: OnceCell<T>,
}

impl<T> LazyValue<T> {
    /// A binding backed by the heap entry at `offset`
    #[must_use]
    pub fn unresolved(offset: u32) -> Self {
        LazyValue {
            source: Some(offset),
            value: OnceCell::new(),
        }
    }

    /// A binding that already holds `value` and has no heap entry behind it
    #[must_use]
    pub fn resolved(value: T) -> Self {
        LazyValue {
            source: None,
            value: OnceCell::from(value),
        }
    }

    /// The heap offset this value was parsed from, `None` once it has been overwritten
    #[must_use]
    pub fn source(&self) -> Option<u32> {
        self.source
    }

    /// Returns true if the value has been materialized
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// Return the value, running `resolve` with the source offset if this is the first access.
    ///
    /// A failed resolution leaves the binding unresolved, the next access retries.
    ///
    /// # Errors
    /// Propagates the error of `resolve`.
    pub fn get_or_resolve<F>(&self, resolve: F) -> Result<&T>
    where
        F: FnOnce(u32) -> Result<T>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let Some(offset) = self.source else {
            return Err(malformed_error!("Deferred value has neither a value nor a source"));
        };

        let value = resolve(offset)?;
        Ok(self.value.get_or_init(|| value))
    }

    /// Overwrite the value. The binding forgets its source offset.
    pub fn set(&mut self, value: T) {
        self.source = None;
        self.value = OnceCell::from(value);
    }
}

/// The memoized result of a back-reference scan.
///
/// An absent relation is cached just like a present one. The cache is only replaced by an
/// explicit [`BackRef::set`] or [`BackRef::reset`]; inserting rows into the scanned table does
/// not invalidate it.
#[derive(Clone, Debug, Default)]
pub struct BackRef {
    cached: OnceCell<Option<Token>>,
}

impl BackRef {
    /// An empty cache, the first access will scan
    #[must_use]
    pub fn new() -> Self {
        BackRef {
            cached: OnceCell::new(),
        }
    }

    /// Return the cached token, running `scan` on first access.
    pub fn get_or_scan<F>(&self, scan: F) -> Option<Token>
    where
        F: FnOnce() -> Option<Token>,
    {
        *self.cached.get_or_init(scan)
    }

    /// The cached outcome, `None` if no scan has happened yet
    #[must_use]
    pub fn cached(&self) -> Option<Option<Token>> {
        self.cached.get().copied()
    }

    /// Explicitly assign the relation
    pub fn set(&mut self, token: Option<Token>) {
        self.cached = OnceCell::from(token);
    }

    /// Forget the cached outcome, the next access scans again
    pub fn reset(&mut self) {
        self.cached = OnceCell::new();
    }
}
