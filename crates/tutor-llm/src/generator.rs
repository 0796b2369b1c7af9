//! # Generator Trait
//!
//! Core abstraction over the external generation service. The system makes
//! exactly three kinds of generation calls — question batches, course-level
//! synthesis, and rubric evaluation — and all of them are defined here so the
//! orchestrator and assessment engine share one contract and one error
//! taxonomy.
//!
//! Every call site wraps the trait through [`ResilientInvoker`]; nothing in
//! the repository calls a [`Generator`] directly with its own retry loop.
//!
//! [`ResilientInvoker`]: crate::invoker::ResilientInvoker

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tutor_core::corpus::KnowledgeCorpus;
use tutor_core::question::{Difficulty, Question, QuestionKind};

/// Result type alias for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur during generation calls.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed structured output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rate limited by the generation service.
    #[error("throttled: {message}")]
    Throttled {
        /// Suggested retry delay from the service, if any.
        retry_after_ms: Option<u64>,
        /// Error description.
        message: String,
    },

    /// The service rejected the request.
    #[error("generation API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// The call was cancelled.
    #[error("generation cancelled")]
    Cancelled,

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl GeneratorError {
    /// Whether this is a throttling-class failure.
    ///
    /// Only throttling is retried; every other failure surfaces immediately.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Suggested retry delay in milliseconds, if the service provided one.
    #[must_use]
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::Throttled { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// Error category string for logs and metrics.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Throttled { .. } => "throttled",
            Self::Api { .. } => "api",
            Self::Cancelled => "cancelled",
            Self::Other { .. } => "unknown",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Input for a question-batch generation call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBatchRequest {
    /// Slice of corpus text the questions must be grounded in.
    pub corpus_slice: String,
    /// Topics to focus on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    /// Requested question shape.
    pub kind: QuestionKind,
    /// Requested difficulty tier.
    pub difficulty: Difficulty,
    /// Number of questions to produce.
    pub count: u32,
}

/// Course-level synthesis returned after all modules are processed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSynthesis {
    /// Multi-paragraph course overview.
    pub overview: String,
    /// Key topics across the whole course.
    pub key_topics: Vec<String>,
    /// Learning outcomes across the whole course.
    pub learning_outcomes: Vec<String>,
    /// Number of modules the synthesis covers.
    pub total_modules: u32,
    /// Suggested study time in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_study_mins: Option<u32>,
}

impl CourseSynthesis {
    /// Synthesis for a run that discovered no modules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            overview: "No course modules were discovered.".into(),
            key_topics: Vec::new(),
            learning_outcomes: Vec::new(),
            total_modules: 0,
            estimated_study_mins: None,
        }
    }
}

/// Verdict from a rubric-evaluation call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricVerdict {
    /// Whether the answer meets the rubric.
    pub correct: bool,
    /// Explanation grounded in the rubric / sample answer.
    pub explanation: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// The three generation calls the system makes.
///
/// Implementors must be `Send + Sync`; one generator instance is shared
/// across all session tasks.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a batch of questions of one shape from a corpus slice.
    async fn generate_questions(
        &self,
        request: &QuestionBatchRequest,
    ) -> GeneratorResult<Vec<Question>>;

    /// Produce the course-level synthesis for a completed corpus.
    async fn synthesize_course(&self, corpus: &KnowledgeCorpus)
    -> GeneratorResult<CourseSynthesis>;

    /// Grade a free-form answer against the question's rubric and sample
    /// answer.
    async fn evaluate_answer(
        &self,
        question: &Question,
        answer: &str,
    ) -> GeneratorResult<RubricVerdict>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttled_is_throttling() {
        let err = GeneratorError::Throttled {
            retry_after_ms: Some(5000),
            message: "too many requests".into(),
        };
        assert!(err.is_throttling());
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.category(), "throttled");
    }

    #[test]
    fn api_error_not_throttling() {
        let err = GeneratorError::Api {
            status: 400,
            message: "bad request".into(),
        };
        assert!(!err.is_throttling());
        assert_eq!(err.retry_after_ms(), None);
        assert_eq!(err.category(), "api");
    }

    #[test]
    fn cancelled_not_throttling() {
        let err = GeneratorError::Cancelled;
        assert!(!err.is_throttling());
        assert_eq!(err.category(), "cancelled");
    }

    #[test]
    fn error_display() {
        let err = GeneratorError::Api {
            status: 422,
            message: "unsupported shape".into(),
        };
        assert_eq!(
            err.to_string(),
            "generation API error (422): unsupported shape"
        );
    }

    #[test]
    fn batch_request_serializes_camel_case() {
        let req = QuestionBatchRequest {
            corpus_slice: "text".into(),
            topics: vec!["cells".into()],
            kind: tutor_core::question::QuestionKind::TrueFalse,
            difficulty: Difficulty::Advanced,
            count: 5,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["corpusSlice"], "text");
        assert_eq!(json["kind"], "true_false");
        assert_eq!(json["difficulty"], "advanced");
        assert_eq!(json["count"], 5);
    }

    #[test]
    fn empty_synthesis_has_zero_modules() {
        let synthesis = CourseSynthesis::empty();
        assert_eq!(synthesis.total_modules, 0);
        assert!(synthesis.key_topics.is_empty());
        assert!(!synthesis.overview.is_empty());
    }

    #[test]
    fn rubric_verdict_roundtrip() {
        let raw = r#"{"correct": true, "explanation": "covers both causes"}"#;
        let verdict: RubricVerdict = serde_json::from_str(raw).unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.explanation, "covers both causes");
    }

    #[test]
    fn generator_is_object_safe() {
        fn assert_object_safe(_: &dyn Generator) {}
        let _ = assert_object_safe;
    }
}
