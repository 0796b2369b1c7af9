//! Training handlers: start, answer, end, get.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;
use tutor_assess::training::{TrainingOptions, TrainingSession};
use tutor_core::question::{Answer, Difficulty, QuestionKind};

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::{require_param, require_string_param};
use crate::registry::MethodHandler;

fn session_to_value(session: &TrainingSession) -> Result<Value, RpcError> {
    Ok(json!({
        "sessionId": session.id,
        "corpusId": session.corpus_id,
        "status": session.status,
        "questionsAnswered": session.questions_answered,
        "correctAnswers": session.correct_answers,
        "score": session.score(),
        "currentQuestion": session.current_question,
    }))
}

/// Start a training session against a stored corpus.
///
/// Accepts either `corpusId` (a corpus produced by ingestion) or an inline
/// `corpus` object supplied by the file-upload collaborator, which is stored
/// before the session starts.
pub struct StartTrainingHandler;

#[async_trait]
impl MethodHandler for StartTrainingHandler {
    #[instrument(skip(self, ctx, params), fields(method = "training.start"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let corpus_id = match params.as_ref().and_then(|p| p.get("corpus")) {
            Some(inline) => {
                let corpus: tutor_core::corpus::KnowledgeCorpus =
                    serde_json::from_value(inline.clone()).map_err(|e| {
                        RpcError::InvalidParams {
                            message: format!("Invalid corpus: {e}"),
                        }
                    })?;
                let id = corpus.id.as_str().to_owned();
                ctx.corpora
                    .put(&id, corpus)
                    .map_err(|e| RpcError::Internal {
                        message: e.to_string(),
                    })?;
                id
            }
            None => require_string_param(params.as_ref(), "corpusId")?,
        };

        let mut options = TrainingOptions::default();
        if let Some(kinds) = params.as_ref().and_then(|p| p.get("questionTypes")) {
            options.question_kinds = serde_json::from_value::<Vec<QuestionKind>>(kinds.clone())
                .map_err(|e| RpcError::InvalidParams {
                    message: format!("Invalid questionTypes: {e}"),
                })?;
            if options.question_kinds.is_empty() {
                return Err(RpcError::InvalidParams {
                    message: "questionTypes must not be empty".into(),
                });
            }
        }
        if let Some(count) = params
            .as_ref()
            .and_then(|p| p.get("questionCount"))
            .and_then(Value::as_u64)
        {
            #[allow(clippy::cast_possible_truncation)]
            {
                options.question_count = (count as u32).max(1);
            }
        }
        if let Some(secs) = params
            .as_ref()
            .and_then(|p| p.get("studyTime"))
            .and_then(Value::as_u64)
        {
            #[allow(clippy::cast_possible_truncation)]
            {
                options.study_time_secs = secs as u32;
            }
        }
        if let Some(difficulty) = params.as_ref().and_then(|p| p.get("difficulty")) {
            options.starting_difficulty = serde_json::from_value::<Difficulty>(difficulty.clone())
                .map_err(|e| RpcError::InvalidParams {
                    message: format!("Invalid difficulty: {e}"),
                })?;
        }

        let session = ctx.engine.start(&corpus_id, options).await?;
        session_to_value(&session)
    }
}

/// Submit an answer for the session's current question.
pub struct AnswerHandler;

#[async_trait]
impl MethodHandler for AnswerHandler {
    #[instrument(skip(self, ctx, params), fields(method = "training.answer"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let answer_value = require_param(params.as_ref(), "answer")?;
        let answer: Answer =
            serde_json::from_value(answer_value.clone()).map_err(|_| RpcError::InvalidParams {
                message: "Parameter 'answer' must be a string or a label mapping".into(),
            })?;

        let outcome = ctx.engine.submit_answer(&session_id, answer).await?;
        serde_json::to_value(&outcome).map_err(|e| RpcError::Internal {
            message: e.to_string(),
        })
    }
}

/// End a session and return the frozen final report.
pub struct EndTrainingHandler;

#[async_trait]
impl MethodHandler for EndTrainingHandler {
    #[instrument(skip(self, ctx, params), fields(method = "training.end"))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let report = ctx.engine.end(&session_id).await?;
        serde_json::to_value(&report).map_err(|e| RpcError::Internal {
            message: e.to_string(),
        })
    }
}

/// Fetch a training session by ID.
pub struct GetTrainingHandler;

#[async_trait]
impl MethodHandler for GetTrainingHandler {
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let session_id = require_string_param(params.as_ref(), "sessionId")?;
        let session = ctx.engine.get_session(&session_id)?;
        session_to_value(&session)
    }
}
