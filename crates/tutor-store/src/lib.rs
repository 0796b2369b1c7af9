//! # tutor-store
//!
//! Keyed session storage shared by the ingestion orchestrator and the
//! assessment engine:
//!
//! - [`SessionStore`]: get/put/delete over a session-id key, no business rules
//! - [`MemoryStore`]: the default in-memory backend
//! - [`OperationLocks`]: per-key exclusive guards so overlapping operations on
//!   one session surface as an explicit busy error instead of a silent race
//!
//! The store is injected rather than ambient, so a persistent backend can
//! replace [`MemoryStore`] without touching orchestration logic.

#![deny(unsafe_code)]

pub mod locks;
pub mod store;

pub use locks::{Busy, LockGuard, OperationLocks};
pub use store::{MemoryStore, SessionStore, StoreError};
