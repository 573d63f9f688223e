use serde::{Deserialize, Serialize};

use crate::errors::{ExError, QgsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Finished,
    Cancelled,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Finished => write!(f, "FINISHED"),
            ReportStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// User-facing outcome of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorReport {
    pub message: String,
    pub severity: Severity,
    pub status: ReportStatus,
}

impl OperatorReport {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
            status: ReportStatus::Finished,
        }
    }

    /// Finished, but something was skipped
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
            status: ReportStatus::Finished,
        }
    }

    /// Cancelled report for a failed operation
    ///
    /// Aborted operations say that the scene was left partially modified;
    /// precondition failures changed nothing.
    pub fn from_error(err: &QgsError) -> Self {
        let message = if err.is_precondition() {
            err.to_string()
        } else {
            let code = ExError::from(err.clone()).code();
            format!("{} (scene may be partially modified, {})", err, code)
        };
        Self {
            message,
            severity: Severity::Error,
            status: ReportStatus::Cancelled,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == ReportStatus::Finished
    }
}

impl std::fmt::Display for OperatorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.severity, self.message)
    }
}
