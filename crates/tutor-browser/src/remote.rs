//! HTTP client for a remote CDP-bridge driver service.
//!
//! The bridge owns the actual browser (connect-over-CDP, login UI, screencast)
//! and exposes the handful of JSON endpoints the state machine needs. Session
//! loss is reported by the bridge as `410 Gone` on any session-scoped route.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::driver::{BrowserDriver, BrowserHandle, DriverError, DriverResult};
use crate::types::{ModuleLink, PageExtract};

/// Client for a remote driver service.
pub struct RemoteDriver {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenResponse {
    session_id: String,
    page_title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverResponse {
    modules: Vec<ModuleLink>,
    #[serde(default)]
    page_title: Option<String>,
    #[serde(default)]
    page_url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl RemoteDriver {
    /// Create a client for the bridge at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    fn session_url(&self, handle: &str, suffix: &str) -> String {
        format!("{}/sessions/{handle}{suffix}", self.base_url)
    }

    /// Map a non-success response to a [`DriverError`].
    async fn error_from_response(response: reqwest::Response) -> DriverError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();
        // The bridge reports an expired or crashed browser as 410 on any
        // session-scoped route.
        if status == 410 {
            DriverError::SessionLost { message }
        } else {
            DriverError::Api { status, message }
        }
    }
}

#[async_trait::async_trait]
impl BrowserDriver for RemoteDriver {
    #[instrument(skip(self), fields(url))]
    async fn open(&self, url: &str) -> DriverResult<BrowserHandle> {
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let body: OpenResponse = response.json().await?;
        debug!(session = body.session_id, "browser session opened");
        Ok(BrowserHandle {
            id: body.session_id,
            page_title: body.page_title,
        })
    }

    async fn discover_modules(&self, handle: &str) -> DriverResult<Vec<ModuleLink>> {
        let response = self
            .client
            .post(self.session_url(handle, "/discover"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let body: DiscoverResponse = response.json().await?;

        // Course pages without a navigation structure are treated as a single
        // module rooted at the landing page.
        if body.modules.is_empty() {
            if let (Some(title), Some(url)) = (body.page_title, body.page_url) {
                return Ok(vec![ModuleLink {
                    title,
                    url,
                    order: 0,
                }]);
            }
        }
        Ok(body.modules)
    }

    async fn navigate(&self, handle: &str, url: &str) -> DriverResult<()> {
        let response = self
            .client
            .post(self.session_url(handle, "/navigate"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    async fn extract(&self, handle: &str) -> DriverResult<PageExtract> {
        let response = self
            .client
            .post(self.session_url(handle, "/extract"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn close(&self, handle: &str) -> DriverResult<()> {
        let response = self
            .client
            .delete(self.session_url(handle, ""))
            .send()
            .await?;
        // Closing an already-released session is a no-op.
        if response.status().as_u16() == 404 || response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from_response(response).await)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
