//! # tutor-server
//!
//! Thin HTTP layer over the RPC action boundary:
//!
//! - `POST /rpc` — dispatch one action-style request
//! - `GET /health` — liveness and uptime
//!
//! Presentation concerns (polling cadence, rendering, streaming viewers)
//! live entirely on the caller side.

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, TutorSettings};
pub use server::TutorServer;
pub use shutdown::ShutdownCoordinator;
