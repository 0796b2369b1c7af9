//! RPC handler modules and registration.

pub mod course;
pub mod system;
pub mod training;

use crate::registry::MethodRegistry;

/// Register all RPC handlers with the registry.
pub fn register_all(registry: &mut MethodRegistry) {
    // System
    registry.register("system.ping", system::PingHandler);
    registry.register("system.info", system::GetInfoHandler);

    // Course ingestion
    registry.register("course.open", course::OpenCourseHandler);
    registry.register("course.continue", course::ContinueCourseHandler);
    registry.register("course.status", course::CourseStatusHandler);
    registry.register("course.stop", course::StopCourseHandler);

    // Training
    registry.register("training.start", training::StartTrainingHandler);
    registry.register("training.answer", training::AnswerHandler);
    registry.register("training.end", training::EndTrainingHandler);
    registry.register("training.get", training::GetTrainingHandler);
}

/// Extract a required parameter from the params object.
pub(crate) fn require_param<'a>(
    params: Option<&'a serde_json::Value>,
    key: &str,
) -> Result<&'a serde_json::Value, crate::errors::RpcError> {
    params
        .and_then(|p| p.get(key))
        .ok_or_else(|| crate::errors::RpcError::InvalidParams {
            message: format!("Missing required parameter: {key}"),
        })
}

/// Extract a required string parameter.
pub(crate) fn require_string_param(
    params: Option<&serde_json::Value>,
    key: &str,
) -> Result<String, crate::errors::RpcError> {
    require_param(params, key)?
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| crate::errors::RpcError::InvalidParams {
            message: format!("Parameter '{key}' must be a string"),
        })
}
