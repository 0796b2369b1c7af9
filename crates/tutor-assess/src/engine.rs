//! Assessment engine — start, answer, end.
//!
//! The engine owns no transport: the generator and both stores are injected,
//! and every generation call (question batches, rubric evaluation) goes
//! through the shared [`ResilientInvoker`]. Per-session operation locks make
//! overlapping `submit` calls for one session an explicit busy error.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, instrument, warn};

use tutor_core::constants::{
    DEFAULT_DEMOTE_STREAK, DEFAULT_PROMOTE_STREAK, DEFAULT_QUESTION_BATCH_SIZE,
};
use tutor_core::corpus::KnowledgeCorpus;
use tutor_core::question::{Answer, Question, QuestionKind};
use tutor_core::retry::RetryPolicy;
use tutor_llm::generator::{Generator, QuestionBatchRequest};
use tutor_llm::invoker::{InvokeError, ResilientInvoker};
use tutor_store::{Busy, OperationLocks, SessionStore, StoreError};

use crate::difficulty::DifficultyTracker;
use crate::grade::{Grade, check_shape, grade};
use crate::training::{
    AnswerOutcome, AnsweredQuestion, FinalReport, TrainingOptions, TrainingSession, TrainingStatus,
};

/// Characters of corpus text included in a question-generation request.
const QUESTION_SLICE_LIMIT: usize = 6_000;

// ─────────────────────────────────────────────────────────────────────────────
// Errors / config
// ─────────────────────────────────────────────────────────────────────────────

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    /// The corpus has no usable text.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// No corpus with the given identifier.
    #[error("corpus not found: {0}")]
    CorpusNotFound(String),

    /// No training session with the given identifier.
    #[error("training session not found: {0}")]
    SessionNotFound(String),

    /// The answer payload does not match the current question's variant.
    #[error("answer shape does not match question variant '{expected}'", expected = .expected.as_str())]
    InvalidAnswerShape {
        /// The variant the current question requires.
        expected: QuestionKind,
    },

    /// The session has no question awaiting an answer.
    #[error("no current question for session: {0}")]
    NoCurrentQuestion(String),

    /// Another operation is in flight for this session.
    #[error(transparent)]
    Busy(#[from] Busy),

    /// Generation failure (fatal or exhausted).
    #[error(transparent)]
    Generation(#[from] InvokeError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Engine tunables.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Consecutive correct answers before requesting a harder tier.
    pub promote_streak: u32,
    /// Consecutive incorrect answers before requesting an easier tier.
    pub demote_streak: u32,
    /// Questions requested per generation call when none is set on the
    /// session options.
    pub batch_size: u32,
    /// Retry policy for generation calls.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            promote_streak: DEFAULT_PROMOTE_STREAK,
            demote_streak: DEFAULT_DEMOTE_STREAK,
            batch_size: DEFAULT_QUESTION_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Adaptive assessment engine over injected stores and generator.
pub struct AssessmentEngine {
    generator: Arc<dyn Generator>,
    sessions: Arc<dyn SessionStore<TrainingSession>>,
    corpora: Arc<dyn SessionStore<KnowledgeCorpus>>,
    locks: OperationLocks,
    invoker: ResilientInvoker,
    config: EngineConfig,
}

impl AssessmentEngine {
    /// Create an engine over injected collaborators and stores.
    pub fn new(
        generator: Arc<dyn Generator>,
        sessions: Arc<dyn SessionStore<TrainingSession>>,
        corpora: Arc<dyn SessionStore<KnowledgeCorpus>>,
        config: EngineConfig,
    ) -> Self {
        let invoker = ResilientInvoker::new(config.retry.clone());
        Self {
            generator,
            sessions,
            corpora,
            locks: OperationLocks::new(),
            invoker,
            config,
        }
    }

    /// Start a training session against a stored corpus.
    ///
    /// Rejects an empty corpus before any generation call. Returns the
    /// session with its first question populated.
    #[instrument(skip(self, options), fields(corpus_id))]
    pub async fn start(
        &self,
        corpus_id: &str,
        options: TrainingOptions,
    ) -> Result<TrainingSession, AssessError> {
        let corpus = self
            .corpora
            .get(corpus_id)?
            .ok_or_else(|| AssessError::CorpusNotFound(corpus_id.to_owned()))?;
        if corpus.is_empty() {
            return Err(AssessError::EmptyCorpus);
        }

        let mut session = TrainingSession::new(corpus.id.clone(), options);
        session.difficulty = DifficultyTracker::new(
            session.options.starting_difficulty,
            self.config.promote_streak,
            self.config.demote_streak,
        );

        let batch = self
            .request_batch(
                &corpus,
                session.next_kind(),
                &session.difficulty,
                self.batch_size(&session),
            )
            .await?;
        session.pending = batch.into();
        session.current_question = session.pending.pop_front();

        self.sessions.put(session.id.as_str(), session.clone())?;
        debug!(
            session = session.id.as_str(),
            corpus = corpus_id,
            "training session started"
        );
        Ok(session)
    }

    /// Grade an answer, update counts and difficulty, and advance to the
    /// next question.
    #[instrument(skip(self, answer), fields(session_id))]
    pub async fn submit_answer(
        &self,
        session_id: &str,
        answer: Answer,
    ) -> Result<AnswerOutcome, AssessError> {
        let _guard = self.locks.try_acquire(session_id)?;

        let mut session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| AssessError::SessionNotFound(session_id.to_owned()))?;

        let question = session
            .current_question
            .clone()
            .filter(|_| session.status == TrainingStatus::Active)
            .ok_or_else(|| AssessError::NoCurrentQuestion(session_id.to_owned()))?;

        // Input-contract check before any mutation.
        if !check_shape(&question, &answer) {
            return Err(AssessError::InvalidAnswerShape {
                expected: question.kind(),
            });
        }

        let (correct, explanation) = match grade(&question, &answer) {
            Grade::Correct => (true, question.meta().explanation.clone()),
            Grade::Incorrect => (false, question.meta().explanation.clone()),
            Grade::NeedsRubric => {
                let submitted = match &answer {
                    Answer::Text(text) => text.clone(),
                    Answer::Pairs(_) => String::new(),
                };
                let verdict = self
                    .invoker
                    .invoke("rubric_evaluation", || async {
                        self.generator.evaluate_answer(&question, &submitted).await
                    })
                    .await?;
                (verdict.correct, verdict.explanation)
            }
        };

        session.questions_answered += 1;
        if correct {
            session.correct_answers += 1;
        }
        let _ = session.difficulty.record(correct);
        session.history.push(AnsweredQuestion {
            question: question.clone(),
            answer,
            correct,
        });

        let mut refill_error = None;
        if session.questions_answered >= session.options.question_count {
            session.current_question = None;
            freeze_report(&mut session);
        } else {
            session.current_question = match session.pending.pop_front() {
                Some(next) => Some(next),
                None => match self.refill(&mut session).await {
                    Ok(next) => next,
                    Err(err) => {
                        // The graded answer still counts; the caller sees the
                        // generation failure and can end the session.
                        warn!(session = session_id, error = %err, "question refill failed");
                        refill_error = Some(err);
                        None
                    }
                },
            };
        }

        self.sessions.put(session_id, session.clone())?;
        if let Some(err) = refill_error {
            return Err(err);
        }

        Ok(AnswerOutcome {
            correct,
            canonical_answer: canonical_answer(&question),
            explanation,
            score: session.score(),
            questions_answered: session.questions_answered,
            next_question: session.current_question.clone(),
        })
    }

    /// Complete the session and return the frozen report. Idempotent.
    #[instrument(skip(self), fields(session_id))]
    pub async fn end(&self, session_id: &str) -> Result<FinalReport, AssessError> {
        let mut session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| AssessError::SessionNotFound(session_id.to_owned()))?;

        if let Some(report) = &session.report {
            return Ok(report.clone());
        }

        session.current_question = None;
        freeze_report(&mut session);
        let report = session
            .report
            .clone()
            .expect("freeze_report always sets a report");
        self.sessions.put(session_id, session)?;
        Ok(report)
    }

    /// Fetch a session by ID.
    pub fn get_session(&self, session_id: &str) -> Result<TrainingSession, AssessError> {
        self.sessions
            .get(session_id)?
            .ok_or_else(|| AssessError::SessionNotFound(session_id.to_owned()))
    }

    // ── internals ──────────────────────────────────────────────────────

    fn batch_size(&self, session: &TrainingSession) -> u32 {
        if session.options.batch_size == 0 {
            self.config.batch_size
        } else {
            session.options.batch_size
        }
    }

    /// Request a fresh batch at the session's adapted difficulty.
    async fn refill(
        &self,
        session: &mut TrainingSession,
    ) -> Result<Option<Question>, AssessError> {
        let corpus = self
            .corpora
            .get(session.corpus_id.as_str())?
            .ok_or_else(|| AssessError::CorpusNotFound(session.corpus_id.as_str().to_owned()))?;
        let batch = self
            .request_batch(
                &corpus,
                session.next_kind(),
                &session.difficulty,
                self.batch_size(session),
            )
            .await?;
        session.pending = batch.into();
        Ok(session.pending.pop_front())
    }

    async fn request_batch(
        &self,
        corpus: &KnowledgeCorpus,
        kind: QuestionKind,
        difficulty: &DifficultyTracker,
        count: u32,
    ) -> Result<Vec<Question>, AssessError> {
        let request = QuestionBatchRequest {
            corpus_slice: truncate_chars(&corpus.text, QUESTION_SLICE_LIMIT),
            topics: corpus.topics.clone(),
            kind,
            difficulty: difficulty.current(),
            count,
        };
        let questions = self
            .invoker
            .invoke("question_generation", || async {
                self.generator.generate_questions(&request).await
            })
            .await?;
        Ok(questions)
    }
}

/// Freeze counts into the final report and mark the session completed.
fn freeze_report(session: &mut TrainingSession) {
    if session.report.is_some() {
        return;
    }
    session.status = TrainingStatus::Completed;
    #[allow(clippy::cast_sign_loss)]
    let elapsed_secs = (Utc::now() - session.started_at).num_seconds().max(0) as u64;
    session.report = Some(FinalReport {
        session_id: session.id.clone(),
        total_questions: session.questions_answered,
        correct_answers: session.correct_answers,
        score: session.score(),
        elapsed_secs,
    });
}

/// Canonical answer as a wire value: a string for text variants, the pair
/// mapping for `match`.
fn canonical_answer(question: &Question) -> serde_json::Value {
    match question {
        Question::Mcq { correct, .. } => json!(correct),
        Question::TrueFalse { correct, .. } => json!(correct.to_string()),
        Question::FillBlank { accepted, .. } => {
            json!(accepted.first().cloned().unwrap_or_default())
        }
        Question::Match { pairs, .. } => serde_json::to_value(pairs).unwrap_or_default(),
        Question::OpenEnded { sample_answer, .. } | Question::Scenario { sample_answer, .. } => {
            json!(sample_answer)
        }
    }
}

/// Truncate to at most `limit` characters.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    text.chars().take(limit).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use tutor_core::question::{Difficulty, McqOption, QuestionMeta};
    use tutor_llm::generator::{GeneratorError, GeneratorResult, RubricVerdict};
    use tutor_store::MemoryStore;

    // -- stub generator --

    /// Produces `count` questions of the requested kind and records every
    /// batch request's difficulty.
    struct StubGenerator {
        requested: Mutex<Vec<Difficulty>>,
        rubric_correct: bool,
        throttle_batches: bool,
    }

    impl Default for StubGenerator {
        fn default() -> Self {
            Self {
                requested: Mutex::new(Vec::new()),
                rubric_correct: true,
                throttle_batches: false,
            }
        }
    }

    fn meta(kind: QuestionKind, difficulty: Difficulty, n: u32) -> QuestionMeta {
        QuestionMeta {
            id: format!("q_{}_{n}", kind.as_str()).into(),
            prompt: format!("Question {n}"),
            explanation: "stored explanation".into(),
            difficulty,
            topic: "cells".into(),
            learning_objective: None,
            estimated_secs: 60,
        }
    }

    fn question_of(kind: QuestionKind, difficulty: Difficulty, n: u32) -> Question {
        match kind {
            QuestionKind::Mcq => Question::Mcq {
                meta: meta(kind, difficulty, n),
                options: vec![
                    McqOption {
                        key: "A".into(),
                        label: "Right".into(),
                    },
                    McqOption {
                        key: "B".into(),
                        label: "Wrong".into(),
                    },
                ],
                correct: "A".into(),
            },
            QuestionKind::TrueFalse => Question::TrueFalse {
                meta: meta(kind, difficulty, n),
                correct: true,
                misconception: None,
            },
            QuestionKind::FillBlank => Question::FillBlank {
                meta: meta(kind, difficulty, n),
                accepted: vec!["mitochondria".into(), "mitochondrion".into()],
                context_clues: None,
            },
            QuestionKind::Match => {
                let mut pairs = BTreeMap::new();
                let _ = pairs.insert("A".to_owned(), "1".to_owned());
                let _ = pairs.insert("B".to_owned(), "2".to_owned());
                let _ = pairs.insert("C".to_owned(), "3".to_owned());
                Question::Match {
                    meta: meta(kind, difficulty, n),
                    left: vec!["A".into(), "B".into(), "C".into()],
                    right: vec!["1".into(), "2".into(), "3".into()],
                    pairs,
                }
            }
            QuestionKind::OpenEnded => Question::OpenEnded {
                meta: meta(kind, difficulty, n),
                sample_answer: "a thorough answer".into(),
                rubric: Some("mentions ATP".into()),
            },
            QuestionKind::Scenario => Question::Scenario {
                meta: meta(kind, difficulty, n),
                scenario_context: None,
                sample_answer: "a thorough plan".into(),
                key_considerations: Vec::new(),
            },
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate_questions(
            &self,
            request: &QuestionBatchRequest,
        ) -> GeneratorResult<Vec<Question>> {
            if self.throttle_batches {
                return Err(GeneratorError::Throttled {
                    retry_after_ms: None,
                    message: "rate limited".into(),
                });
            }
            self.requested.lock().push(request.difficulty);
            Ok((0..request.count)
                .map(|n| question_of(request.kind, request.difficulty, n))
                .collect())
        }

        async fn synthesize_course(
            &self,
            _corpus: &KnowledgeCorpus,
        ) -> GeneratorResult<tutor_llm::generator::CourseSynthesis> {
            unreachable!("engine never synthesizes")
        }

        async fn evaluate_answer(
            &self,
            _question: &Question,
            _answer: &str,
        ) -> GeneratorResult<RubricVerdict> {
            Ok(RubricVerdict {
                correct: self.rubric_correct,
                explanation: "rubric explanation".into(),
            })
        }
    }

    // -- fixture --

    struct Fixture {
        engine: AssessmentEngine,
    }

    fn corpus_with_text(text: &str) -> KnowledgeCorpus {
        let mut corpus = KnowledgeCorpus::new("Cell Biology");
        corpus.text = text.into();
        corpus.topics = vec!["cells".into()];
        corpus
    }

    fn fixture_with(generator: StubGenerator, corpus: &KnowledgeCorpus) -> Fixture {
        let corpora = Arc::new(MemoryStore::new());
        corpora.put(corpus.id.as_str(), corpus.clone()).unwrap();
        let engine = AssessmentEngine::new(
            Arc::new(generator),
            Arc::new(MemoryStore::new()),
            corpora,
            EngineConfig::default(),
        );
        Fixture { engine }
    }

    fn five_hundred_words() -> String {
        "photosynthesis converts light energy into chemical energy ".repeat(63)
    }

    fn options(kinds: Vec<QuestionKind>, count: u32, batch: u32) -> TrainingOptions {
        TrainingOptions {
            question_kinds: kinds,
            question_count: count,
            batch_size: batch,
            ..TrainingOptions::default()
        }
    }

    // -- start --

    #[tokio::test]
    async fn start_with_true_false_yields_current_question() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);

        let session = f
            .engine
            .start(
                corpus.id.as_str(),
                options(vec![QuestionKind::TrueFalse], 10, 5),
            )
            .await
            .unwrap();

        assert_eq!(session.questions_answered, 0);
        assert!((session.score() - 0.0).abs() < f64::EPSILON);
        let current = session.current_question.unwrap();
        assert_eq!(current.kind(), QuestionKind::TrueFalse);
    }

    #[tokio::test]
    async fn start_empty_corpus_rejected() {
        let corpus = corpus_with_text("   ");
        let f = fixture_with(StubGenerator::default(), &corpus);

        let err = f
            .engine
            .start(corpus.id.as_str(), TrainingOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, AssessError::EmptyCorpus);
    }

    #[tokio::test]
    async fn start_unknown_corpus_rejected() {
        let corpus = corpus_with_text("text");
        let f = fixture_with(StubGenerator::default(), &corpus);
        let err = f
            .engine
            .start("corp_missing", TrainingOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, AssessError::CorpusNotFound(_));
    }

    // -- submit --

    #[tokio::test]
    async fn three_of_four_scores_75() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 5))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        for answer in ["A", "A", "A", "B"] {
            let outcome = f
                .engine
                .submit_answer(&sid, Answer::Text(answer.into()))
                .await
                .unwrap();
            assert_eq!(outcome.correct, answer == "A");
        }

        let session = f.engine.get_session(&sid).unwrap();
        assert_eq!(session.questions_answered, 4);
        assert_eq!(session.correct_answers, 3);
        assert!((session.score() - 75.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn outcome_carries_canonical_answer_and_next() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 5))
            .await
            .unwrap();

        let outcome = f
            .engine
            .submit_answer(session.id.as_str(), Answer::Text("B".into()))
            .await
            .unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.canonical_answer, json!("A"));
        assert_eq!(outcome.explanation, "stored explanation");
        assert_eq!(outcome.questions_answered, 1);
        assert!(outcome.next_question.is_some());
    }

    #[tokio::test]
    async fn wrong_shape_rejected_without_mutation() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 5))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        let err = f
            .engine
            .submit_answer(&sid, Answer::Pairs(BTreeMap::new()))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            AssessError::InvalidAnswerShape {
                expected: QuestionKind::Mcq
            }
        );

        let after = f.engine.get_session(&sid).unwrap();
        assert_eq!(after.questions_answered, 0);
        assert!(after.current_question.is_some());
        assert!(after.history.is_empty());
    }

    #[tokio::test]
    async fn unknown_session_rejected() {
        let corpus = corpus_with_text("text");
        let f = fixture_with(StubGenerator::default(), &corpus);
        let err = f
            .engine
            .submit_answer("ts_missing", Answer::Text("A".into()))
            .await
            .unwrap_err();
        assert_matches!(err, AssessError::SessionNotFound(_));
    }

    #[tokio::test]
    async fn match_partial_submission_graded_incorrect() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Match], 10, 5))
            .await
            .unwrap();

        let mut partial = BTreeMap::new();
        let _ = partial.insert("A".to_owned(), "1".to_owned());
        let _ = partial.insert("B".to_owned(), "2".to_owned());
        let outcome = f
            .engine
            .submit_answer(session.id.as_str(), Answer::Pairs(partial))
            .await
            .unwrap();
        assert!(!outcome.correct);
    }

    #[tokio::test]
    async fn rubric_verdict_drives_open_ended_grading() {
        let corpus = corpus_with_text(&five_hundred_words());
        let generator = StubGenerator {
            rubric_correct: false,
            ..StubGenerator::default()
        };
        let f = fixture_with(generator, &corpus);
        let session = f
            .engine
            .start(
                corpus.id.as_str(),
                options(vec![QuestionKind::OpenEnded], 10, 5),
            )
            .await
            .unwrap();

        let outcome = f
            .engine
            .submit_answer(session.id.as_str(), Answer::Text("plants breathe".into()))
            .await
            .unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.explanation, "rubric explanation");
    }

    // -- difficulty adaptation --

    #[tokio::test]
    async fn three_correct_requests_advanced_next() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        // batch size 1 so every answer triggers a fresh request
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 1))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        for _ in 0..3 {
            let _ = f
                .engine
                .submit_answer(&sid, Answer::Text("A".into()))
                .await
                .unwrap();
        }

        let session = f.engine.get_session(&sid).unwrap();
        assert_eq!(session.difficulty.current(), Difficulty::Advanced);
        // the question now pending was requested at the promoted tier
        assert_eq!(
            session.current_question.unwrap().meta().difficulty,
            Difficulty::Advanced
        );
    }

    #[tokio::test]
    async fn two_incorrect_at_advanced_requests_intermediate() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(
                corpus.id.as_str(),
                TrainingOptions {
                    question_kinds: vec![QuestionKind::Mcq],
                    question_count: 10,
                    batch_size: 1,
                    starting_difficulty: Difficulty::Advanced,
                    ..TrainingOptions::default()
                },
            )
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        for _ in 0..2 {
            let _ = f
                .engine
                .submit_answer(&sid, Answer::Text("B".into()))
                .await
                .unwrap();
        }

        let session = f.engine.get_session(&sid).unwrap();
        assert_eq!(session.difficulty.current(), Difficulty::Intermediate);
        assert_eq!(
            session.current_question.unwrap().meta().difficulty,
            Difficulty::Intermediate
        );
    }

    // -- completion / end --

    #[tokio::test]
    async fn reaching_question_count_completes_session() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 2, 5))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        let first = f
            .engine
            .submit_answer(&sid, Answer::Text("A".into()))
            .await
            .unwrap();
        assert!(first.next_question.is_some());

        let second = f
            .engine
            .submit_answer(&sid, Answer::Text("A".into()))
            .await
            .unwrap();
        assert!(second.next_question.is_none());

        let session = f.engine.get_session(&sid).unwrap();
        assert_eq!(session.status, TrainingStatus::Completed);
        assert!(session.report.is_some());
    }

    #[tokio::test]
    async fn end_is_idempotent_and_freezes_report() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 5))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        let _ = f
            .engine
            .submit_answer(&sid, Answer::Text("A".into()))
            .await
            .unwrap();

        let first = f.engine.end(&sid).await.unwrap();
        assert_eq!(first.total_questions, 1);
        assert_eq!(first.correct_answers, 1);
        assert!((first.score - 100.0).abs() < f64::EPSILON);

        let second = f.engine.end(&sid).await.unwrap();
        assert_eq!(second.total_questions, first.total_questions);
        assert!((second.score - first.score).abs() < f64::EPSILON);
        assert_eq!(second.elapsed_secs, first.elapsed_secs);
    }

    #[tokio::test]
    async fn submit_after_end_rejected() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(corpus.id.as_str(), options(vec![QuestionKind::Mcq], 10, 5))
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();

        let _ = f.engine.end(&sid).await.unwrap();
        let err = f
            .engine
            .submit_answer(&sid, Answer::Text("A".into()))
            .await
            .unwrap_err();
        assert_matches!(err, AssessError::NoCurrentQuestion(_));
    }

    // -- generation failure --

    #[tokio::test(start_paused = true)]
    async fn throttled_batches_surface_exhaustion_on_start() {
        let corpus = corpus_with_text(&five_hundred_words());
        let generator = StubGenerator {
            throttle_batches: true,
            ..StubGenerator::default()
        };
        let f = fixture_with(generator, &corpus);

        let err = f
            .engine
            .start(corpus.id.as_str(), TrainingOptions::default())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            AssessError::Generation(InvokeError::GenerationExhausted { .. })
        );
    }

    #[tokio::test]
    async fn kind_cycling_across_submissions() {
        let corpus = corpus_with_text(&five_hundred_words());
        let f = fixture_with(StubGenerator::default(), &corpus);
        let session = f
            .engine
            .start(
                corpus.id.as_str(),
                options(vec![QuestionKind::Mcq, QuestionKind::FillBlank], 10, 1),
            )
            .await
            .unwrap();
        let sid = session.id.as_str().to_owned();
        assert_eq!(
            f.engine
                .get_session(&sid)
                .unwrap()
                .current_question
                .unwrap()
                .kind(),
            QuestionKind::Mcq
        );

        let outcome = f
            .engine
            .submit_answer(&sid, Answer::Text("A".into()))
            .await
            .unwrap();
        assert_eq!(outcome.next_question.unwrap().kind(), QuestionKind::FillBlank);
    }
}
