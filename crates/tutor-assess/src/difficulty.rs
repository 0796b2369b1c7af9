//! Streak-based difficulty adaptation.
//!
//! Promotion and demotion streak lengths are configuration points (they were
//! empirically chosen upstream), defaulting to the values in
//! `tutor_core::constants`.

use serde::{Deserialize, Serialize};
use tutor_core::constants::{DEFAULT_DEMOTE_STREAK, DEFAULT_PROMOTE_STREAK};
use tutor_core::question::Difficulty;

/// Tracks answer streaks and adapts the requested difficulty tier.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyTracker {
    current: Difficulty,
    promote_streak: u32,
    demote_streak: u32,
    consecutive_correct: u32,
    consecutive_incorrect: u32,
}

impl DifficultyTracker {
    /// Create a tracker starting at `start` with the given streak lengths.
    #[must_use]
    pub fn new(start: Difficulty, promote_streak: u32, demote_streak: u32) -> Self {
        Self {
            current: start,
            promote_streak: promote_streak.max(1),
            demote_streak: demote_streak.max(1),
            consecutive_correct: 0,
            consecutive_incorrect: 0,
        }
    }

    /// Tracker with the default streak lengths.
    #[must_use]
    pub fn with_defaults(start: Difficulty) -> Self {
        Self::new(start, DEFAULT_PROMOTE_STREAK, DEFAULT_DEMOTE_STREAK)
    }

    /// The tier the next generated question should request.
    #[must_use]
    pub fn current(&self) -> Difficulty {
        self.current
    }

    /// Record an answer and return the (possibly adjusted) tier.
    ///
    /// Promotion after `promote_streak` consecutive correct answers, demotion
    /// after `demote_streak` consecutive incorrect ones; both reset the
    /// streak and clamp at the tier bounds.
    pub fn record(&mut self, correct: bool) -> Difficulty {
        if correct {
            self.consecutive_correct += 1;
            self.consecutive_incorrect = 0;
            if self.consecutive_correct >= self.promote_streak {
                self.current = self.current.harder();
                self.consecutive_correct = 0;
            }
        } else {
            self.consecutive_incorrect += 1;
            self.consecutive_correct = 0;
            if self.consecutive_incorrect >= self.demote_streak {
                self.current = self.current.easier();
                self.consecutive_incorrect = 0;
            }
        }
        self.current
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
