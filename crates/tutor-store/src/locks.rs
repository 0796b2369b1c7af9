//! Per-key exclusive operation locks.
//!
//! The calling protocol is an asynchronous polling interface, so overlapping
//! requests for the same session id are legitimate client behavior. The locks
//! here turn "an operation is already in flight for key K" into an explicit
//! error instead of relying on caller discipline.
//!
//! A [`LockGuard`] releases its key on drop, so early returns and `?` cannot
//! leak a held key.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Error returned when a key is already held.
#[derive(Debug, thiserror::Error)]
#[error("operation already in flight for session {key}")]
pub struct Busy {
    /// The contended key.
    pub key: String,
}

/// Per-key try-acquire locks.
#[derive(Clone, Default)]
pub struct OperationLocks {
    held: Arc<DashMap<String, ()>>,
}

impl OperationLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            held: Arc::new(DashMap::new()),
        }
    }

    /// Try to acquire the lock for a key.
    ///
    /// Returns [`Busy`] without blocking if the key is already held.
    pub fn try_acquire(&self, key: &str) -> Result<LockGuard, Busy> {
        match self.held.entry(key.to_owned()) {
            Entry::Occupied(_) => Err(Busy {
                key: key.to_owned(),
            }),
            Entry::Vacant(slot) => {
                let _ = slot.insert(());
                Ok(LockGuard {
                    held: self.held.clone(),
                    key: key.to_owned(),
                })
            }
        }
    }

    /// Whether a key is currently held.
    #[must_use]
    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains_key(key)
    }
}

/// RAII guard for an acquired key; releases on drop.
#[derive(Debug)]
pub struct LockGuard {
    held: Arc<DashMap<String, ()>>,
    key: String,
}

impl LockGuard {
    /// The guarded key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.held.remove(&self.key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
