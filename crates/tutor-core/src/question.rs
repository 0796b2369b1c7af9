//! Question and answer vocabulary.
//!
//! [`Question`] is a tagged union with one constructor per question shape, so
//! validation and rendering are exhaustive matches and an unhandled variant is
//! a compile-time error. Questions are immutable once generated; a fresh batch
//! is requested rather than editing an existing one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::QuestionId;

// ─────────────────────────────────────────────────────────────────────────────
// Difficulty
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered difficulty tiers for generated questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Entry tier.
    Beginner,
    /// Default tier.
    Intermediate,
    /// Hardest tier.
    Advanced,
}

impl Difficulty {
    /// The next harder tier, clamped at [`Difficulty::Advanced`].
    #[must_use]
    pub fn harder(self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate | Self::Advanced => Self::Advanced,
        }
    }

    /// The next easier tier, clamped at [`Difficulty::Beginner`].
    #[must_use]
    pub fn easier(self) -> Self {
        match self {
            Self::Advanced => Self::Intermediate,
            Self::Intermediate | Self::Beginner => Self::Beginner,
        }
    }

    /// Stable string form used in logs and generation requests.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Intermediate
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Question
// ─────────────────────────────────────────────────────────────────────────────

/// Discriminant-only view of the six question shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Multiple choice with a single correct option.
    Mcq,
    /// True/false statement.
    TrueFalse,
    /// Fill in the blank, free-text answer.
    FillBlank,
    /// Match left-column labels to right-column labels.
    Match,
    /// Free-form answer graded against a rubric.
    OpenEnded,
    /// Applied scenario graded against a rubric.
    Scenario,
}

impl QuestionKind {
    /// Stable string form matching the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "true_false",
            Self::FillBlank => "fill_blank",
            Self::Match => "match",
            Self::OpenEnded => "open_ended",
            Self::Scenario => "scenario",
        }
    }
}

/// Fields shared by every question variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMeta {
    /// Question identifier.
    pub id: QuestionId,
    /// Prompt text shown to the learner.
    pub prompt: String,
    /// Explanation returned with the grading result.
    pub explanation: String,
    /// Difficulty tier this question was generated at.
    pub difficulty: Difficulty,
    /// Topic tag from the corpus.
    pub topic: String,
    /// Learning objective this question exercises.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_objective: Option<String>,
    /// Estimated answering time in seconds.
    pub estimated_secs: u32,
}

/// One answer option of an MCQ question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqOption {
    /// Option key (e.g. `"A"`).
    pub key: String,
    /// Option label text.
    pub label: String,
}

/// A generated assessment question.
///
/// Serialized with a `type` tag matching [`QuestionKind::as_str`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Question {
    /// Multiple choice.
    Mcq {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Ordered option set.
        options: Vec<McqOption>,
        /// Key of the correct option.
        correct: String,
    },
    /// True/false statement.
    TrueFalse {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Whether the statement is true.
        correct: bool,
        /// Misconception the statement tests, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        misconception: Option<String>,
    },
    /// Fill in the blank.
    FillBlank {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Acceptable canonical answers; any match counts.
        accepted: Vec<String>,
        /// Hint about the surrounding context.
        #[serde(skip_serializing_if = "Option::is_none")]
        context_clues: Option<String>,
    },
    /// Column matching.
    Match {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Left-column labels.
        left: Vec<String>,
        /// Right-column labels.
        right: Vec<String>,
        /// Canonical bijection from left label to right label.
        pairs: BTreeMap<String, String>,
    },
    /// Open-ended, rubric graded.
    OpenEnded {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Example of a strong answer.
        sample_answer: String,
        /// Grading rubric for the evaluator.
        #[serde(skip_serializing_if = "Option::is_none")]
        rubric: Option<String>,
    },
    /// Scenario-based, rubric graded.
    Scenario {
        /// Shared fields.
        #[serde(flatten)]
        meta: QuestionMeta,
        /// Background for the scenario.
        #[serde(skip_serializing_if = "Option::is_none")]
        scenario_context: Option<String>,
        /// Example of a strong answer.
        sample_answer: String,
        /// Factors a good answer should weigh.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        key_considerations: Vec<String>,
    },
}

impl Question {
    /// Shared metadata of any variant.
    #[must_use]
    pub fn meta(&self) -> &QuestionMeta {
        match self {
            Self::Mcq { meta, .. }
            | Self::TrueFalse { meta, .. }
            | Self::FillBlank { meta, .. }
            | Self::Match { meta, .. }
            | Self::OpenEnded { meta, .. }
            | Self::Scenario { meta, .. } => meta,
        }
    }

    /// Shape discriminant of this question.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Mcq { .. } => QuestionKind::Mcq,
            Self::TrueFalse { .. } => QuestionKind::TrueFalse,
            Self::FillBlank { .. } => QuestionKind::FillBlank,
            Self::Match { .. } => QuestionKind::Match,
            Self::OpenEnded { .. } => QuestionKind::OpenEnded,
            Self::Scenario { .. } => QuestionKind::Scenario,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Answer
// ─────────────────────────────────────────────────────────────────────────────

/// A learner-submitted answer.
///
/// The payload shape is constrained by the paired question's variant: a text
/// answer for everything except `match`, which takes a left-to-right label
/// mapping. Shape checking happens in the assessment engine before grading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Left-to-right label mapping for `match` questions.
    Pairs(BTreeMap<String, String>),
    /// Free text, option key, or true/false literal.
    Text(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
