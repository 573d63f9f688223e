//! Read-only queries over a scene
//!
//! Queries never mutate; they let a front end preview what a destructive
//! operation would touch.

pub mod change_counts;

pub use change_counts::{count_qgs_changes, ChangeCounts};
