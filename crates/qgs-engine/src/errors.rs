//! Engine error helpers
//!
//! Engine-level I/O reports failures with the canonical `ExError` facility.

use std::path::Path;

use qgs_core::errors::{ExError, ExErrorKind};

pub type Result<T> = std::result::Result<T, ExError>;

pub(crate) fn io_error(op: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op)
        .with_entity_id(path.display().to_string())
        .with_message(err.to_string())
}

pub(crate) fn parse_error(op: &str, path: &Path, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op)
        .with_entity_id(path.display().to_string())
        .with_message(message)
}
