//! # Browser Driver Trait
//!
//! Core abstraction over the external browser-automation collaborator. The
//! orchestrator only ever talks to [`BrowserDriver`]; whether the other side
//! is a CDP bridge, a hosted browser pool, or a test stub is invisible to it.

use async_trait::async_trait;

use crate::types::{ModuleLink, PageExtract};

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors reported by the browser collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// HTTP transport failure talking to the driver service.
    #[error("driver transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The driver service rejected the request.
    #[error("driver error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The underlying browser session is gone (expired, crashed, logged out).
    #[error("browser session lost: {message}")]
    SessionLost {
        /// Error description.
        message: String,
    },

    /// Malformed payload from the driver service.
    #[error("driver payload error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// Whether the owning ingestion session can no longer make progress.
    ///
    /// A fatal error moves the session to its error state; anything else is
    /// recorded on the current module and iteration continues.
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::SessionLost { .. })
    }
}

/// Handle to an opened browser session.
#[derive(Clone, Debug)]
pub struct BrowserHandle {
    /// Opaque session identifier on the driver side.
    pub id: String,
    /// Title of the initially loaded page.
    pub page_title: String,
}

/// Operations the ingestion state machine needs from a browser.
///
/// Implementors must be `Send + Sync`; one handle is bound to exactly one
/// ingestion session and is never shared across sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a browser at the given URL and wait for the initial load.
    async fn open(&self, url: &str) -> DriverResult<BrowserHandle>;

    /// Enumerate module links on the currently loaded page.
    ///
    /// An empty list is a valid outcome, not an error.
    async fn discover_modules(&self, handle: &str) -> DriverResult<Vec<ModuleLink>>;

    /// Navigate the session to a URL and wait for the page to settle.
    async fn navigate(&self, handle: &str, url: &str) -> DriverResult<()>;

    /// Extract text, media references, and optionally a screenshot from the
    /// current page.
    async fn extract(&self, handle: &str) -> DriverResult<PageExtract>;

    /// Release the browser session. Closing an unknown handle is a no-op.
    async fn close(&self, handle: &str) -> DriverResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
