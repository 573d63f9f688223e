//! Revert Orchestrator
//!
//! Undoes every tool-made change in four ordered phases: mode normalization,
//! rejoin, restore-or-clear, detag and reset. A failing phase stops the run;
//! the scene is returned to Object mode on every exit path.

use serde::{Deserialize, Serialize};

use super::backup_ops::{self, BackupRecord};
use super::bone_ops::BoneParentHistory;
use super::partition_ops;
use super::scene::Scene;
use super::tag_ops::{self, ClearCounts, TagTarget};
use crate::config::ToolConfig;
use crate::errors::{QgsError, Result};
use crate::model::{MeshData, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertPhase {
    ModeNormalization,
    Rejoin,
    RestoreOrClear,
    DetagAndReset,
}

impl std::fmt::Display for RevertPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RevertPhase::ModeNormalization => "mode_normalization",
            RevertPhase::Rejoin => "rejoin",
            RevertPhase::RestoreOrClear => "restore_or_clear",
            RevertPhase::DetagAndReset => "detag_and_reset",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertSummary {
    /// Objects that survived the revert with their transforms reset
    pub targets: Vec<String>,
    /// Object the backup was restored onto, if a backup was live
    pub restored: Option<String>,
    pub cleared: ClearCounts,
    /// Bone history entries dropped with their armatures
    pub history_forgotten: usize,
}

type PhaseResult<T> = std::result::Result<T, (RevertPhase, QgsError)>;

/// Undo all tool activity in the scene
///
/// With a live backup, the pieces partitioned out of the backed-up mesh are
/// joined into one target which then gets the backed-up geometry. Every other
/// tagged mesh is its own target and keeps its geometry. Either way all tags, prefixed groups,
/// reserved modifiers and tagged armatures are removed and the targets'
/// transforms are reset to identity.
///
/// # Errors
///
/// Returns `RevertPhaseFailed` naming the failing phase and the phases that
/// completed before it.
pub fn revert_all(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    config: &ToolConfig,
) -> Result<RevertSummary> {
    let mut completed = Vec::new();
    let outcome = run_phases(scene, history, config, &mut completed);
    scene.force_object_mode();

    outcome.map_err(|(phase, err)| {
        tracing::debug!(%phase, error = %err, "revert phase failed");
        QgsError::RevertPhaseFailed {
            phase: phase.to_string(),
            completed: completed.iter().map(ToString::to_string).collect(),
            reason: err.to_string(),
        }
    })
}

fn run_phases(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    config: &ToolConfig,
    completed: &mut Vec<RevertPhase>,
) -> PhaseResult<RevertSummary> {
    let at = |phase: RevertPhase| move |err: QgsError| (phase, err);
    let mut summary = RevertSummary::default();

    scene.force_object_mode();
    completed.push(RevertPhase::ModeNormalization);

    let record = backup_ops::current(scene).map_err(at(RevertPhase::Rejoin))?;
    let tagged = tag_ops::tagged_meshes(scene);
    let (joined, others) = match &record {
        Some(record) => {
            let pieces = backup_pieces(record);
            let others: Vec<String> = tagged.into_iter().filter(|m| !pieces.contains(m)).collect();
            let name = output_name(config, record);
            let joined = partition_ops::rejoin_objects(scene, &pieces, &name)
                .map_err(at(RevertPhase::Rejoin))?;
            let target = match joined {
                Some(target) => target,
                None => scene.add_mesh_object(&name, MeshData::new(name.as_str())),
            };
            (Some(target), others)
        }
        None => (None, tagged),
    };
    completed.push(RevertPhase::Rejoin);

    summary.cleared += untag(scene, &others);
    if let (Some(record), Some(target)) = (&record, joined) {
        let name = output_name(config, record);
        match backup_ops::restore(scene, &record.id, &target, &name) {
            Ok(restored) => {
                summary.restored = Some(restored.clone());
                summary.targets.push(restored);
            }
            Err(QgsError::BackupNotFound { id }) => {
                tracing::debug!(backup_id = %id, "backup block missing, keeping joined geometry");
                backup_ops::consume(scene, &record.id);
                summary.cleared += untag(scene, std::slice::from_ref(&target));
                summary.targets.push(target);
            }
            Err(err) => return Err((RevertPhase::RestoreOrClear, err)),
        }
    }
    summary.targets.extend(others);
    completed.push(RevertPhase::RestoreOrClear);

    summary.cleared += tag_ops::clear_all(scene);
    summary.history_forgotten = history.forget_missing(scene);
    for target in &summary.targets {
        scene
            .object_mut(target)
            .map_err(at(RevertPhase::DetagAndReset))?
            .transform = Transform::IDENTITY;
    }
    completed.push(RevertPhase::DetagAndReset);

    tracing::debug!(
        targets = summary.targets.len(),
        restored = summary.restored.is_some(),
        "reverted all changes"
    );
    Ok(summary)
}

/// Objects that hold geometry of the backed-up source: its pieces and the
/// source itself while it still exists
fn backup_pieces(record: &BackupRecord) -> Vec<String> {
    let mut pieces = record.pieces.clone();
    if !pieces.contains(&record.source_object) {
        pieces.push(record.source_object.clone());
    }
    pieces
}

fn output_name(config: &ToolConfig, record: &BackupRecord) -> String {
    config
        .output_name
        .clone()
        .unwrap_or_else(|| record.source_object.clone())
}

/// Strip ownership from each target, keeping the node and its geometry
fn untag(scene: &mut Scene, targets: &[String]) -> ClearCounts {
    let mut counts = ClearCounts::default();
    for target in targets {
        counts += tag_ops::clear(scene, &TagTarget::Object(target.clone()), true);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mode, ObjectKind};
    use crate::ops::{partition_ops::separate_with_backup, rig_ops::create_rig};
    use glam::Vec3;

    fn two_meshes() -> Scene {
        let mut scene = Scene::new();
        for (i, name) in ["Barrel", "Grip"].into_iter().enumerate() {
            let mesh = MeshData::with_geometry(name, vec![Vec3::ZERO, Vec3::Y], vec![]);
            scene.add_mesh_object(name, mesh);
            scene.object_mut(name).unwrap().transform.location = Vec3::new(i as f32, 0.0, 0.0);
        }
        scene.select_only(["Barrel", "Grip"]).unwrap();
        scene
    }

    #[test]
    fn test_revert_rig_only_keeps_meshes_separate() {
        let mut scene = two_meshes();
        let mut history = BoneParentHistory::new();
        let config = ToolConfig::default();
        create_rig(&mut scene, &mut history, &config).unwrap();

        let summary = revert_all(&mut scene, &mut history, &config).unwrap();

        assert_eq!(summary.targets, vec!["Barrel", "Grip"]);
        assert!(summary.restored.is_none());
        assert!(scene.objects_of_kind(ObjectKind::Armature).is_empty());
        for name in ["Barrel", "Grip"] {
            assert!(scene.object(name).unwrap().transform.is_identity());
            assert!(scene.mesh_data(name).unwrap().vertex_groups.is_empty());
        }
    }

    #[test]
    fn test_revert_restores_backup() {
        let mut scene = Scene::new();
        let mut mesh = MeshData::with_geometry("Gun", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![]);
        mesh.ensure_group("Barrel").set_weight(0, 1.0);
        mesh.ensure_group("Grip").set_weight(1, 1.0);
        let original = mesh.geometry_digest();
        scene.add_mesh_object("Gun", mesh);
        scene.set_active("Gun").unwrap();
        let mut history = BoneParentHistory::new();
        separate_with_backup(&mut scene, None).unwrap();

        let summary = revert_all(&mut scene, &mut history, &ToolConfig::default()).unwrap();

        assert_eq!(summary.restored.as_deref(), Some("Gun"));
        assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Gun"]);
        assert_eq!(scene.mesh_data("Gun").unwrap().geometry_digest(), original);
        assert!(backup_ops::current(&scene).unwrap().is_none());
        assert_eq!(scene.mode(), Mode::Object);
    }

    #[test]
    fn test_revert_with_backup_keeps_other_tagged_meshes() {
        let mut scene = two_meshes();
        let mut history = BoneParentHistory::new();
        let config = ToolConfig::default();
        create_rig(&mut scene, &mut history, &config).unwrap();
        let grip = scene.mesh_data("Grip").unwrap().geometry_digest();
        separate_with_backup(&mut scene, Some("Barrel")).unwrap();

        let summary = revert_all(&mut scene, &mut history, &config).unwrap();

        assert_eq!(summary.restored.as_deref(), Some("Barrel"));
        assert_eq!(summary.targets, vec!["Barrel", "Grip"]);
        assert_eq!(scene.mesh_data("Grip").unwrap().geometry_digest(), grip);
        assert_eq!(scene.mesh_data("Barrel").unwrap().vertex_count(), 2);
    }

    #[test]
    fn test_revert_reports_failed_phase() {
        let mut scene = two_meshes();
        scene.props.set(backup_ops::BACKUP_SLOT_KEY, serde_json::json!("garbage"));
        scene.set_active("Barrel").unwrap();
        scene.set_mode(Mode::Edit).unwrap();
        let mut history = BoneParentHistory::new();

        let err = revert_all(&mut scene, &mut history, &ToolConfig::default()).unwrap_err();

        match err {
            QgsError::RevertPhaseFailed {
                phase, completed, ..
            } => {
                assert_eq!(phase, "rejoin");
                assert_eq!(completed, vec!["mode_normalization"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(scene.mode(), Mode::Object);
    }
}
