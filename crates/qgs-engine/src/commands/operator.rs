//! Operator boundary
//!
//! Wraps `qgs_core::apply` with lifecycle logging and turns every outcome
//! into an `OperatorReport`. This is the only place start/end events are
//! emitted; core operations log at debug level only.

use std::time::Instant;

use qgs_core::errors::ExError;
use qgs_core::rules::validation::collect_violations;
use qgs_core::{apply, log_op_end, log_op_error, log_op_start};
use qgs_core::{Command, OperatorReport, Session};
use qgs_core_types::correlation::RequestContext;

/// Run a command with a fresh request context
pub fn execute(session: &mut Session, cmd: Command) -> OperatorReport {
    execute_with_context(session, cmd, &RequestContext::new())
}

/// Run a command, logging its lifecycle under `ctx`
///
/// Failures never escape as errors: they come back as Cancelled reports so a
/// front end can print them the same way as successes.
pub fn execute_with_context(
    session: &mut Session,
    cmd: Command,
    ctx: &RequestContext,
) -> OperatorReport {
    let op = cmd.op_name();
    let start = Instant::now();
    log_op_start!(
        op,
        request_id = ctx.request_id.as_str(),
        trace_id = ctx.trace_str()
    );

    match apply(session, cmd) {
        Ok(report) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            log_op_end!(
                op,
                duration_ms = duration_ms,
                request_id = ctx.request_id.as_str(),
                trace_id = ctx.trace_str(),
                severity = %report.severity
            );
            for violation in collect_violations(&session.scene) {
                tracing::warn!(op = op, %violation, "scene invariant violated after operation");
            }
            report
        }
        Err(err) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            let report = OperatorReport::from_error(&err);
            let mut ex_err = ExError::from(err).with_request_id(ctx.request_id.clone());
            if let Some(trace_id) = &ctx.trace_id {
                ex_err = ex_err.with_trace_id(trace_id.clone());
            }
            log_op_error!(
                op,
                ex_err,
                duration_ms = duration_ms,
                request_id = ctx.request_id.as_str(),
                trace_id = ctx.trace_str()
            );
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgs_core::ops::scene::Scene;
    use qgs_core::{MeshData, ReportStatus, Severity};

    #[test]
    fn test_failure_becomes_cancelled_report() {
        let mut session = Session::new(Scene::new());

        let report = execute(&mut session, Command::Separate { object: None });

        assert_eq!(report.status, ReportStatus::Cancelled);
        assert_eq!(report.severity, Severity::Error);
    }

    #[test]
    fn test_success_report_passes_through() {
        let mut scene = Scene::new();
        scene.add_mesh_object("Cube", MeshData::new("Cube"));
        scene.select_only(["Cube"]).unwrap();
        let mut session = Session::new(scene);

        let report = execute(&mut session, Command::CreateRig);

        assert!(report.is_finished());
        assert!(session.scene.has_object("QGS_Armature"));
    }
}
