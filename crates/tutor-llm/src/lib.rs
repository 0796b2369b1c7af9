//! # tutor-llm
//!
//! Contract with the external generation service and the resilience layer
//! around it:
//!
//! - [`Generator`]: async trait covering the three generation calls the
//!   system makes (question batches, course synthesis, rubric evaluation)
//! - [`ResilientInvoker`]: the single retry/backoff wrapper every generation
//!   call goes through — backoff math lives in `tutor_core::retry`
//! - [`HttpGenerator`]: reqwest client for a JSON generation endpoint
//!
//! Prompt text is owned by the service behind [`Generator`]; this crate only
//! models inputs and structured outputs.

#![deny(unsafe_code)]

pub mod generator;
pub mod http;
pub mod invoker;

pub use generator::{
    CourseSynthesis, Generator, GeneratorError, GeneratorResult, QuestionBatchRequest,
    RubricVerdict,
};
pub use http::HttpGenerator;
pub use invoker::{InvokeError, ResilientInvoker};
