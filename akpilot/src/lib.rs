//! Screen-driven game automation driver.
//!
//! Everything here runs against one exclusive interactive surface through
//! the `Session` capability interface: the frame source captures pixels,
//! the `vision` crate interprets them, the action executor injects pointer
//! and keyboard events, and the task orchestrators sequence the three. The
//! binary in `main.rs` is a thin clap shell over one orchestrator call.

pub mod capture;
pub mod config;
pub mod diag;
pub mod error;
pub mod input;
pub mod poll;
pub mod sanity;
pub mod session;
pub mod task;

#[cfg(test)]
pub(crate) mod testkit;

pub use config::Config;
pub use diag::DiagnosticSink;
pub use error::{Error, Result};
pub use session::{LiveSession, Session};
