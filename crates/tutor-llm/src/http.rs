//! HTTP client for a JSON generation service.
//!
//! The service owns prompt construction and model choice; this client only
//! speaks the structured contract: corpus slice in, typed payload out.
//! Throttling is reported as `429` with an optional `Retry-After` header in
//! seconds.

use serde::Deserialize;
use tracing::instrument;
use tutor_core::corpus::KnowledgeCorpus;
use tutor_core::question::Question;

use crate::generator::{
    CourseSynthesis, Generator, GeneratorError, GeneratorResult, QuestionBatchRequest,
    RubricVerdict,
};

/// Characters of corpus text sent with a synthesis request.
const SYNTHESIS_TEXT_SAMPLE_LIMIT: usize = 8_000;

/// Truncate to at most `limit` bytes without splitting a character.
fn truncate_at_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Client for a remote generation service.
pub struct HttpGenerator {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct QuestionBatchResponse {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpGenerator {
    /// Create a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Map a non-success response to a [`GeneratorError`].
    async fn error_from_response(response: reqwest::Response) -> GeneratorError {
        let status = response.status().as_u16();
        let retry_after_ms = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();

        if status == 429 {
            GeneratorError::Throttled {
                retry_after_ms,
                message,
            }
        } else {
            GeneratorError::Api { status, message }
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        route: &str,
        body: &serde_json::Value,
    ) -> GeneratorResult<T> {
        let response = self
            .client
            .post(format!("{}{route}", self.base_url))
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl Generator for HttpGenerator {
    #[instrument(skip(self, request), fields(kind = request.kind.as_str(), count = request.count))]
    async fn generate_questions(
        &self,
        request: &QuestionBatchRequest,
    ) -> GeneratorResult<Vec<Question>> {
        let body = serde_json::to_value(request)?;
        let response: QuestionBatchResponse = self.post_json("/v1/questions", &body).await?;
        Ok(response.questions)
    }

    #[instrument(skip(self, corpus), fields(corpus = corpus.id.as_str()))]
    async fn synthesize_course(
        &self,
        corpus: &KnowledgeCorpus,
    ) -> GeneratorResult<CourseSynthesis> {
        let body = serde_json::json!({
            "title": corpus.title,
            "moduleSummaries": corpus.module_summaries,
            "textSample": truncate_at_boundary(&corpus.text, SYNTHESIS_TEXT_SAMPLE_LIMIT),
            "media": corpus.media,
        });
        self.post_json("/v1/synthesize", &body).await
    }

    async fn evaluate_answer(
        &self,
        question: &Question,
        answer: &str,
    ) -> GeneratorResult<RubricVerdict> {
        let body = serde_json::json!({
            "question": question,
            "answer": answer,
        });
        self.post_json("/v1/evaluate", &body).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
