//! Read-only commands
//!
//! Usage:
//!   qgs count
//!   qgs validate

use qgs_core::count_qgs_changes;
use qgs_core::rules::validation::collect_violations;

use super::{open, CliResult, SessionArgs};

pub fn execute_count(session_args: &SessionArgs) -> CliResult {
    let (session, _) = open(session_args)?;

    let counts = count_qgs_changes(&session.scene);
    if counts.is_empty() {
        println!("No QGS changes in scene");
    } else {
        println!("{}", counts);
    }
    Ok(())
}

pub fn execute_validate(session_args: &SessionArgs) -> CliResult {
    let (session, _) = open(session_args)?;

    let violations = collect_violations(&session.scene);
    if violations.is_empty() {
        println!("✓ Scene is consistent");
        return Ok(());
    }
    for violation in &violations {
        println!("✗ {}", violation);
    }
    Err(format!("{} invariant violation(s)", violations.len()).into())
}
