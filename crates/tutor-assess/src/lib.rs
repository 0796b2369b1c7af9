//! # tutor-assess
//!
//! The adaptive assessment engine:
//!
//! - [`grade`]: per-variant answer shape checks and grading rules
//! - [`difficulty`]: streak-based difficulty adaptation
//! - [`training`]: the `TrainingSession` record, options, outcomes, and the
//!   frozen final report
//! - [`engine`]: start / submit / end against an injected session store,
//!   with all generation calls routed through the resilient invoker
//!
//! Grading is an exhaustive match over the question union; adding a variant
//! without a rule is a compile-time error.

#![deny(unsafe_code)]

pub mod difficulty;
pub mod engine;
pub mod grade;
pub mod training;

pub use difficulty::DifficultyTracker;
pub use engine::{AssessError, AssessmentEngine, EngineConfig};
pub use grade::{Grade, check_shape, grade};
pub use training::{
    AnswerOutcome, AnsweredQuestion, FinalReport, TrainingOptions, TrainingSession, TrainingStatus,
};
