//! # tutor-ingest
//!
//! The content-ingestion half of the system:
//!
//! - [`session`]: `ProcessingSession` record, status enum, and the legal
//!   transition table
//! - [`aggregator`]: pure fold from processed modules to a
//!   `KnowledgeCorpus`
//! - [`orchestrator`]: drives a browser session through discovery,
//!   per-module extraction, and course synthesis, one tokio task per
//!   session with cooperative cancellation
//!
//! The browser and generation collaborators are injected as trait objects;
//! nothing here owns transport concerns.

#![deny(unsafe_code)]

pub mod aggregator;
pub mod orchestrator;
pub mod session;

pub use aggregator::{AggregatorConfig, aggregate};
pub use orchestrator::{IngestConfig, IngestError, IngestEvent, IngestOrchestrator};
pub use session::{Module, ProcessingSession, ProcessingStatus, StatusSnapshot};
