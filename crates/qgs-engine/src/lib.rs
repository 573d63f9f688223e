//! QGS Engine - Orchestration layer
//!
//! Runs tool commands against a persisted session with lifecycle logging,
//! and owns the I/O around the core: session files, configuration and the
//! self-updater.

pub mod commands;
pub mod config;
pub mod errors;

pub use commands::operator::{execute, execute_with_context};
pub use config::EngineConfig;
pub use errors::Result;
