//! Command orchestration layer.
//!
//! Provides the operator boundary and the I/O commands that surround it.

pub mod operator;
pub mod session_file;
pub mod update;
