//! # tutor-core
//!
//! Foundation types shared by every Tutor crate:
//!
//! - **Branded IDs**: `ProcessingSessionId`, `TrainingSessionId`, `CorpusId`,
//!   `QuestionId` as newtypes for type safety
//! - **Retry**: `RetryPolicy` and the portable backoff math behind the
//!   resilient invoker
//! - **Corpus**: `KnowledgeCorpus` produced by ingestion and consumed by
//!   assessment
//! - **Questions**: the `Question` tagged union, `Answer`, and `Difficulty`
//!   tiers shared by the generator contract and the assessment engine
//! - **Constants**: tunable thresholds (failure streaks, difficulty streaks,
//!   truncation limits)

#![deny(unsafe_code)]

pub mod constants;
pub mod corpus;
pub mod ids;
pub mod question;
pub mod retry;
