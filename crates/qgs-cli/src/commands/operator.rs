//! Operator commands
//!
//! Usage:
//!   qgs create-rig
//!   qgs separate [OBJECT]
//!   qgs reparent|unparent|reverse-parent [ARMATURE]
//!   qgs revert

use clap::Args;
use qgs_core::{Command, Severity};
use qgs_core_types::correlation::{RequestContext, TraceId};

use super::{open, save, CliResult, SessionArgs};

#[derive(Debug, Args)]
pub struct SeparateArgs {
    /// Mesh to separate (default: active object)
    pub object: Option<String>,
}

#[derive(Debug, Args)]
pub struct ArmatureArgs {
    /// Armature to edit (default: active object)
    pub armature: Option<String>,
}

/// Run one operator and persist the scene it leaves behind
///
/// The session is saved even when the operator fails: aborted operations
/// leave partial changes that the file must reflect.
pub fn execute(cmd: Command, session_args: &SessionArgs) -> CliResult {
    let (mut session, _) = open(session_args)?;

    let ctx = RequestContext::in_trace(&TraceId::new());
    let report = qgs_engine::execute_with_context(&mut session, cmd, &ctx);
    save(&session, session_args)?;

    if !report.is_finished() || report.severity == Severity::Error {
        return Err(report.to_string().into());
    }
    println!("{}", report);
    Ok(())
}
