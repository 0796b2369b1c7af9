//! RPC error codes, the handler error type, and domain-error mappings.

use tutor_assess::engine::AssessError;
use tutor_ingest::orchestrator::IngestError;
use tutor_llm::invoker::InvokeError;

use crate::types::RpcErrorBody;

// ── Error code constants ────────────────────────────────────────────

/// Invalid or missing parameters.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Unexpected internal error.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
/// Method not found in the registry.
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
/// Operation not valid in the session's current state.
pub const INVALID_OPERATION: &str = "INVALID_OPERATION";
/// Session does not exist.
pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
/// An operation is already in flight for this session.
pub const SESSION_BUSY: &str = "SESSION_BUSY";
/// Knowledge corpus does not exist.
pub const CORPUS_NOT_FOUND: &str = "CORPUS_NOT_FOUND";
/// The corpus has no usable content.
pub const EMPTY_CORPUS: &str = "EMPTY_CORPUS";
/// The answer payload does not match the question variant.
pub const INVALID_ANSWER_SHAPE: &str = "INVALID_ANSWER_SHAPE";
/// All generation attempts were throttled.
pub const GENERATION_EXHAUSTED: &str = "GENERATION_EXHAUSTED";
/// Browser driver failure.
pub const BROWSER_ERROR: &str = "BROWSER_ERROR";

/// RPC error type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Required parameter missing or wrong type.
    #[error("{message}")]
    InvalidParams {
        /// Description of what is wrong.
        message: String,
    },

    /// Requested resource not found.
    #[error("{message}")]
    NotFound {
        /// Specific error code (e.g. `SESSION_NOT_FOUND`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Description.
        message: String,
    },

    /// Domain-specific error with arbitrary code.
    #[error("{message}")]
    Custom {
        /// Machine-readable code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl RpcError {
    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::NotFound { code, .. } | Self::Custom { code, .. } => code,
            Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Convert to the wire-format error body.
    pub fn to_error_body(&self) -> RpcErrorBody {
        RpcErrorBody {
            code: self.code().to_owned(),
            message: self.to_string(),
            details: None,
        }
    }
}

impl From<IngestError> for RpcError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::SessionNotFound(_) => Self::NotFound {
                code: SESSION_NOT_FOUND.into(),
                message: err.to_string(),
            },
            IngestError::Busy(_) => Self::Custom {
                code: SESSION_BUSY.into(),
                message: err.to_string(),
            },
            IngestError::InvalidState { .. } => Self::Custom {
                code: INVALID_OPERATION.into(),
                message: err.to_string(),
            },
            IngestError::BrowserUnavailable(_) | IngestError::Driver(_) => Self::Custom {
                code: BROWSER_ERROR.into(),
                message: err.to_string(),
            },
            IngestError::Store(_) => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

impl From<AssessError> for RpcError {
    fn from(err: AssessError) -> Self {
        match err {
            AssessError::EmptyCorpus => Self::Custom {
                code: EMPTY_CORPUS.into(),
                message: err.to_string(),
            },
            AssessError::CorpusNotFound(_) => Self::NotFound {
                code: CORPUS_NOT_FOUND.into(),
                message: err.to_string(),
            },
            AssessError::SessionNotFound(_) => Self::NotFound {
                code: SESSION_NOT_FOUND.into(),
                message: err.to_string(),
            },
            AssessError::InvalidAnswerShape { .. } => Self::Custom {
                code: INVALID_ANSWER_SHAPE.into(),
                message: err.to_string(),
            },
            AssessError::NoCurrentQuestion(_) => Self::Custom {
                code: INVALID_OPERATION.into(),
                message: err.to_string(),
            },
            AssessError::Busy(_) => Self::Custom {
                code: SESSION_BUSY.into(),
                message: err.to_string(),
            },
            AssessError::Generation(ref invoke_err) => match invoke_err {
                InvokeError::GenerationExhausted { .. } => Self::Custom {
                    code: GENERATION_EXHAUSTED.into(),
                    message: err.to_string(),
                },
                InvokeError::Fatal(_) | InvokeError::Cancelled => Self::Internal {
                    message: err.to_string(),
                },
            },
            AssessError::Store(_) => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::question::QuestionKind;
    use tutor_ingest::session::ProcessingStatus;

    #[test]
    fn invalid_params_code() {
        let err = RpcError::InvalidParams {
            message: "bad".into(),
        };
        assert_eq!(err.code(), INVALID_PARAMS);
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn not_found_code() {
        let err = RpcError::NotFound {
            code: SESSION_NOT_FOUND.into(),
            message: "gone".into(),
        };
        assert_eq!(err.code(), SESSION_NOT_FOUND);
    }

    #[test]
    fn to_error_body_includes_code_and_message() {
        let err = RpcError::Custom {
            code: EMPTY_CORPUS.into(),
            message: "corpus is empty".into(),
        };
        let body = err.to_error_body();
        assert_eq!(body.code, EMPTY_CORPUS);
        assert_eq!(body.message, "corpus is empty");
        assert!(body.details.is_none());
    }

    #[test]
    fn ingest_not_found_maps_to_session_not_found() {
        let err: RpcError = IngestError::SessionNotFound("ps_1".into()).into();
        assert_eq!(err.code(), SESSION_NOT_FOUND);
    }

    #[test]
    fn ingest_invalid_state_maps_to_invalid_operation() {
        let err: RpcError = IngestError::InvalidState {
            status: ProcessingStatus::Stopped,
            operation: "continue_after_login",
        }
        .into();
        assert_eq!(err.code(), INVALID_OPERATION);
        assert!(err.to_string().contains("stopped"));
    }

    #[test]
    fn assess_empty_corpus_maps_to_empty_corpus() {
        let err: RpcError = AssessError::EmptyCorpus.into();
        assert_eq!(err.code(), EMPTY_CORPUS);
    }

    #[test]
    fn assess_shape_maps_to_invalid_answer_shape() {
        let err: RpcError = AssessError::InvalidAnswerShape {
            expected: QuestionKind::Match,
        }
        .into();
        assert_eq!(err.code(), INVALID_ANSWER_SHAPE);
        assert!(err.to_string().contains("match"));
    }

    #[test]
    fn exhaustion_maps_to_generation_exhausted() {
        let err: RpcError = AssessError::Generation(InvokeError::GenerationExhausted {
            attempts: 5,
            source: tutor_llm::generator::GeneratorError::Throttled {
                retry_after_ms: None,
                message: "rate limited".into(),
            },
        })
        .into();
        assert_eq!(err.code(), GENERATION_EXHAUSTED);
    }
}
