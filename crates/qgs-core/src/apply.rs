//! Command boundary
//!
//! `apply()` is the single entry point front ends use to run an operation
//! against a session.
//!
//! ## Failure contract
//!
//! - **Preconditions** are checked before anything is touched: a precondition
//!   error means the session is unchanged
//! - **Aborts** (`PartitionAborted`, `RevertPhaseFailed`) leave the scene in
//!   the intermediate state reached; there is no rollback
//! - **No panics**: invalid input returns typed errors
//!
//! ## Example
//!
//! ```
//! use qgs_core::{apply, Command, MeshData, Session};
//! use qgs_core::ops::scene::Scene;
//!
//! let mut scene = Scene::new();
//! scene.add_mesh_object("Cube", MeshData::new("Cube"));
//! scene.select_only(["Cube"]).unwrap();
//!
//! let mut session = Session::new(scene);
//! let report = apply(&mut session, Command::CreateRig).unwrap();
//! assert!(report.is_finished());
//! ```

use crate::commands::Command;
use crate::errors::Result;
use crate::ops::{bone_ops, partition_ops, revert_ops, rig_ops};
use crate::report::OperatorReport;
use crate::session::Session;

/// Run a command against a session
///
/// # Errors
///
/// Returns the command's `QgsError`. Use `OperatorReport::from_error` to turn
/// it into a user-facing report.
pub fn apply(session: &mut Session, cmd: Command) -> Result<OperatorReport> {
    let Session {
        scene,
        history,
        config,
    } = session;

    match cmd {
        Command::CreateRig => {
            let rig = rig_ops::create_rig(scene, history, config)?;
            Ok(OperatorReport::info(format!(
                "Created {} with {} bones",
                rig.armature,
                rig.bones.len()
            )))
        }

        Command::Separate { object } => {
            let separation = partition_ops::separate_with_backup(scene, object.as_deref())?;
            let outcome = separation.outcome;
            let mut message = format!(
                "Separated {} objects: {}",
                outcome.created.len(),
                outcome.created.join(", ")
            );
            if let Some(residual) = &outcome.residual {
                message.push_str(&format!("; unassigned vertices remain in {}", residual));
            }
            if outcome.skipped_groups.is_empty() {
                Ok(OperatorReport::info(message))
            } else {
                message.push_str(&format!(
                    "; skipped empty groups: {}",
                    outcome.skipped_groups.join(", ")
                ));
                Ok(OperatorReport::warning(message))
            }
        }

        Command::Reparent { armature } => {
            let armature = resolve(scene, armature)?;
            let summary = bone_ops::reparent(scene, history, &armature)?;
            let message = format!(
                "Parented {} bones to {}",
                summary.reparented.len(),
                summary.parent
            );
            if summary.skipped_cycles.is_empty() {
                Ok(OperatorReport::info(message))
            } else {
                Ok(OperatorReport::warning(format!(
                    "{}; skipped {} that would create a loop",
                    message,
                    summary.skipped_cycles.join(", ")
                )))
            }
        }

        Command::Unparent { armature } => {
            let armature = resolve(scene, armature)?;
            let summary = bone_ops::unparent(scene, history, &armature)?;
            if summary.unparented.is_empty() {
                Ok(OperatorReport::warning("No selected bone had a parent"))
            } else {
                Ok(OperatorReport::info(format!(
                    "Cleared parent of {} bones",
                    summary.unparented.len()
                )))
            }
        }

        Command::ReverseParent { armature } => {
            let armature = resolve(scene, armature)?;
            let summary = bone_ops::reverse(scene, history, &armature)?;
            if summary.changed + summary.unchanged == 0 {
                Ok(OperatorReport::warning(
                    "No parent history for the selected bones",
                ))
            } else {
                Ok(OperatorReport::info(format!(
                    "Restored parent of {} bones ({} already in place, {} without history)",
                    summary.changed, summary.unchanged, summary.no_history
                )))
            }
        }

        Command::RevertAll => {
            let summary = revert_ops::revert_all(scene, history, config)?;
            Ok(OperatorReport::info(format!(
                "Reverted all changes: {}",
                summary.cleared
            )))
        }
    }
}

fn resolve(scene: &crate::ops::scene::Scene, name: Option<String>) -> Result<String> {
    match name {
        Some(name) => Ok(name),
        None => scene.require_active(),
    }
}
