//! # tutor-browser
//!
//! Contract between the ingestion orchestrator and the external
//! browser-automation collaborator:
//!
//! - [`BrowserDriver`]: async trait the orchestrator drives (open, discover,
//!   navigate, extract, close)
//! - [`RemoteDriver`]: HTTP client for a CDP-bridge service
//! - Wire types for module links and page extraction payloads
//!
//! Screen streaming and the login UI live entirely on the collaborator side;
//! this crate only models the discrete operations the state machine needs.

#![deny(unsafe_code)]

pub mod driver;
pub mod remote;
pub mod types;

pub use driver::{BrowserDriver, BrowserHandle, DriverError};
pub use remote::RemoteDriver;
pub use types::{MediaKind, MediaRef, ModuleLink, PageExtract};
