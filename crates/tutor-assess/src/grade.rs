//! Per-variant answer validation and grading.
//!
//! Two separate steps, by design:
//!
//! 1. [`check_shape`] — does the answer payload match the variant's contract
//!    at all? A mismatch is an input-contract violation and must not mutate
//!    session state.
//! 2. [`grade`] — is a well-shaped answer correct? Rubric-graded variants
//!    return [`Grade::NeedsRubric`] for the engine to resolve through the
//!    resilient invoker.

use tutor_core::question::{Answer, Question};

/// Grading result for a shape-checked answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Grade {
    /// The answer matches the canonical answer.
    Correct,
    /// The answer does not match.
    Incorrect,
    /// Correctness is delegated to a rubric-evaluation call.
    NeedsRubric,
}

/// Whether the answer payload shape matches the question's variant contract.
///
/// Everything except `match` takes a text answer; `match` takes a mapping of
/// left-column to right-column labels. A mapping with *fewer pairs* than the
/// canonical one is well-shaped (it grades as incorrect); a text answer to a
/// `match` question is not.
#[must_use]
pub fn check_shape(question: &Question, answer: &Answer) -> bool {
    match question {
        Question::Match { .. } => matches!(answer, Answer::Pairs(_)),
        Question::Mcq { .. }
        | Question::TrueFalse { .. }
        | Question::FillBlank { .. }
        | Question::OpenEnded { .. }
        | Question::Scenario { .. } => matches!(answer, Answer::Text(_)),
    }
}

/// Grade a well-shaped answer against the question's canonical answer.
///
/// Callers must run [`check_shape`] first; a mismatched payload here grades
/// as incorrect rather than panicking.
#[must_use]
pub fn grade(question: &Question, answer: &Answer) -> Grade {
    match question {
        Question::Mcq { correct, .. } => match answer {
            Answer::Text(submitted) => verdict(submitted.trim() == correct),
            Answer::Pairs(_) => Grade::Incorrect,
        },
        Question::TrueFalse { correct, .. } => match answer {
            Answer::Text(submitted) => {
                let canonical = if *correct { "true" } else { "false" };
                verdict(submitted.trim().eq_ignore_ascii_case(canonical))
            }
            Answer::Pairs(_) => Grade::Incorrect,
        },
        Question::FillBlank { accepted, .. } => match answer {
            Answer::Text(submitted) => {
                let normalized = normalize(submitted);
                verdict(accepted.iter().any(|a| normalize(a) == normalized))
            }
            Answer::Pairs(_) => Grade::Incorrect,
        },
        Question::Match { pairs, .. } => match answer {
            // Correct iff the submission is the total canonical bijection.
            // No partial credit; missing or extra pairs are incorrect.
            Answer::Pairs(submitted) => verdict(submitted == pairs),
            Answer::Text(_) => Grade::Incorrect,
        },
        Question::OpenEnded { .. } | Question::Scenario { .. } => Grade::NeedsRubric,
    }
}

fn verdict(correct: bool) -> Grade {
    if correct { Grade::Correct } else { Grade::Incorrect }
}

/// Trim and case-fold for fill-blank comparison.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
