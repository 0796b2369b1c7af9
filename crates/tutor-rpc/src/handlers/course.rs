//! Course-ingestion handlers: open, continue, status, stop.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::require_string_param;
use crate::registry::MethodHandler;

fn snapshot_to_value(
    snapshot: &tutor_ingest::session::StatusSnapshot,
) -> Result<Value, RpcError> {
    serde_json::to_value(snapshot).map_err(|e| RpcError::Internal {
        message: e.to_string(),
    })
}

/// Open a browser at a course URL and wait for manual login.
pub struct OpenCourseHandler;

#[async_trait]
impl MethodHandler for OpenCourseHandler {
    #[instrument(skip(self, ctx, params), fields(method = "course.open"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let course_url = require_string_param(params.as_ref(), "courseUrl")?;
        let snapshot = ctx.orchestrator.open_browser(&course_url).await?;
        snapshot_to_value(&snapshot)
    }
}

/// Begin discovery and processing after the caller confirms login.
pub struct ContinueCourseHandler;

#[async_trait]
impl MethodHandler for ContinueCourseHandler {
    #[instrument(skip(self, ctx, params), fields(method = "course.continue"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let snapshot = ctx.orchestrator.continue_after_login(&session_id)?;
        snapshot_to_value(&snapshot)
    }
}

/// Poll a session's progress.
pub struct CourseStatusHandler;

#[async_trait]
impl MethodHandler for CourseStatusHandler {
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let snapshot = ctx.orchestrator.get_status(&session_id)?;
        snapshot_to_value(&snapshot)
    }
}

/// Stop a session and release its browser.
pub struct StopCourseHandler;

#[async_trait]
impl MethodHandler for StopCourseHandler {
    #[instrument(skip(self, ctx, params), fields(method = "course.stop"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let snapshot = ctx.orchestrator.stop(&session_id).await?;
        snapshot_to_value(&snapshot)
    }
}
