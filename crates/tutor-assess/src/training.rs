//! Training-session record, options, and result types.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_core::constants::DEFAULT_QUESTION_BATCH_SIZE;
use tutor_core::ids::{CorpusId, TrainingSessionId};
use tutor_core::question::{Answer, Difficulty, Question, QuestionKind};

use crate::difficulty::DifficultyTracker;

/// Lifecycle of a training session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Accepting answers.
    Active,
    /// Finished; counts frozen in the final report.
    Completed,
}

/// Caller-supplied options for a training session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingOptions {
    /// Question shapes to cycle through.
    pub question_kinds: Vec<QuestionKind>,
    /// Total questions before the session auto-completes.
    pub question_count: u32,
    /// Study time the learner spent beforehand, in seconds.
    pub study_time_secs: u32,
    /// Tier the first batch is requested at.
    pub starting_difficulty: Difficulty,
    /// Questions requested per generation call.
    pub batch_size: u32,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            question_kinds: vec![QuestionKind::Mcq, QuestionKind::OpenEnded],
            question_count: 10,
            study_time_secs: 0,
            starting_difficulty: Difficulty::Intermediate,
            batch_size: DEFAULT_QUESTION_BATCH_SIZE,
        }
    }
}

/// One answered question in the session history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    /// The question as asked.
    pub question: Question,
    /// The submitted answer.
    pub answer: Answer,
    /// Whether it was graded correct.
    pub correct: bool,
}

/// One learner's run through adaptively generated questions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    /// Session identifier.
    pub id: TrainingSessionId,
    /// The corpus questions are generated from.
    pub corpus_id: CorpusId,
    /// Lifecycle state.
    pub status: TrainingStatus,
    /// Answered questions, in order.
    pub history: Vec<AnsweredQuestion>,
    /// Count of answered questions.
    pub questions_answered: u32,
    /// Count of correct answers.
    pub correct_answers: u32,
    /// The question awaiting an answer, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Question>,
    /// Generated questions queued after the current one.
    pub pending: VecDeque<Question>,
    /// Session options as supplied at start.
    pub options: TrainingOptions,
    /// Difficulty adaptation state.
    pub difficulty: DifficultyTracker,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Frozen final report, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FinalReport>,
}

impl TrainingSession {
    /// Create an active session with no questions yet.
    #[must_use]
    pub fn new(corpus_id: CorpusId, options: TrainingOptions) -> Self {
        let difficulty = DifficultyTracker::with_defaults(options.starting_difficulty);
        Self {
            id: TrainingSessionId::new(),
            corpus_id,
            status: TrainingStatus::Active,
            history: Vec::new(),
            questions_answered: 0,
            correct_answers: 0,
            current_question: None,
            pending: VecDeque::new(),
            options,
            difficulty,
            started_at: Utc::now(),
            report: None,
        }
    }

    /// Running score: `100 * correct / answered`, 0 before any answer.
    #[must_use]
    pub fn score(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) * 100.0 / f64::from(self.questions_answered)
    }

    /// The question shape to request next, cycling through the configured
    /// kinds by answered count.
    #[must_use]
    pub fn next_kind(&self) -> QuestionKind {
        let kinds = &self.options.question_kinds;
        if kinds.is_empty() {
            return QuestionKind::Mcq;
        }
        kinds[self.questions_answered as usize % kinds.len()]
    }
}

/// Result returned for each submitted answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Whether the submitted answer was correct.
    pub correct: bool,
    /// Canonical answer: a string for text variants, an object for `match`.
    pub canonical_answer: serde_json::Value,
    /// Explanation for the grading.
    pub explanation: String,
    /// Updated running score.
    pub score: f64,
    /// Updated answered count.
    pub questions_answered: u32,
    /// The next question, absent when the session is exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<Question>,
}

/// Frozen summary returned by `end` (and by auto-completion).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    /// Session identifier.
    pub session_id: TrainingSessionId,
    /// Total answered questions.
    pub total_questions: u32,
    /// Correct answers.
    pub correct_answers: u32,
    /// Final score (0–100).
    pub score: f64,
    /// Wall-clock session length in seconds.
    pub elapsed_secs: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
