//! # tutor-rpc
//!
//! The action-style invocation boundary consumed by the HTTP server:
//!
//! - [`types`]: request/response envelopes in the wire format
//! - [`errors`]: error codes and the handler error type, including the
//!   mappings from domain errors
//! - [`context`]: dependency-injection context handed to every handler
//! - [`registry`]: method registry and async dispatch
//! - [`handlers`]: course-ingestion and training method handlers

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod handlers;
pub mod registry;
pub mod types;

pub use context::RpcContext;
pub use errors::RpcError;
pub use registry::{MethodHandler, MethodRegistry};
pub use types::{RpcErrorBody, RpcRequest, RpcResponse};
