//! Partition Engine
//!
//! Splits a mesh object into one object per non-empty vertex group, and joins
//! tagged pieces back together.

use serde::{Deserialize, Serialize};

use super::backup_ops::{self, BackupId};
use super::scene::Scene;
use super::tag_ops::{self, TagTarget};
use crate::errors::{QgsError, Result};
use crate::model::{Mode, ObjectKind};

/// Result of partitioning one mesh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOutcome {
    /// One object per non-empty group, in group order
    pub created: Vec<String>,
    /// Groups that selected no vertices
    pub skipped_groups: Vec<String>,
    /// The source object when vertices were left over
    pub residual: Option<String>,
    /// Groups whose separation produced several pieces that were merged
    pub merged_fragments: usize,
}

/// Result of `separate_with_backup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separation {
    pub backup_id: BackupId,
    pub outcome: PartitionOutcome,
}

fn aborted(object: &str, group: &str, reason: impl Into<String>) -> QgsError {
    QgsError::PartitionAborted {
        object: object.to_string(),
        group: group.to_string(),
        reason: reason.into(),
    }
}

/// Split `object` into one tagged object per non-empty vertex group
///
/// Each result is named after its group with the reserved prefix stripped.
/// A group that separates into several pieces is joined back into one.
/// Afterwards the source is deleted if it is empty, otherwise tagged and
/// kept as the residual. The scene is left in Object mode.
///
/// # Errors
///
/// Returns the lookup errors of the scene for a bad `object`, and
/// `PartitionAborted` if the source disappears mid-way. Geometry already
/// separated stays separated.
pub fn partition(scene: &mut Scene, object: &str) -> Result<PartitionOutcome> {
    partition_tracked(scene, object, None)
}

/// `partition`, keeping the piece list of backup `backup` current after
/// every group so an aborted run can still be reverted
fn partition_tracked(
    scene: &mut Scene,
    object: &str,
    backup: Option<&BackupId>,
) -> Result<PartitionOutcome> {
    let groups = scene.mesh_data(object)?.group_names();
    let mut outcome = PartitionOutcome::default();
    let mut targets = Vec::new();

    for group in groups {
        if !scene.has_object(object) {
            return Err(aborted(object, &group, "source object no longer exists"));
        }

        scene.set_mode(Mode::Object)?;
        scene.set_active(object)?;
        scene.set_mode(Mode::Edit)?;
        scene.deselect_vertices();
        let selected = scene.select_vertices_in_group(&group)?;
        if selected == 0 {
            tracing::debug!(object, group = %group, "skipping empty vertex group");
            scene.set_mode(Mode::Object)?;
            outcome.skipped_groups.push(group);
            continue;
        }

        let before = scene.object_names();
        scene.separate_selected()?;
        scene.set_mode(Mode::Object)?;
        let new_objects: Vec<String> = scene
            .object_names()
            .difference(&before)
            .cloned()
            .collect();

        let piece = match new_objects.as_slice() {
            [] => return Err(aborted(object, &group, "separation produced no object")),
            [single] => single.clone(),
            [first, ..] => {
                scene.select_only(&new_objects)?;
                scene.set_active(first)?;
                scene.join_selected()?;
                outcome.merged_fragments += 1;
                first.clone()
            }
        };

        let target = tag_ops::strip_prefix(&group).to_string();
        let named = scene.rename_object(&piece, &target)?;
        scene.rename_data(&named, &target)?;
        tag_ops::mark(scene, &TagTarget::Object(named.clone()))?;
        tracing::debug!(object, group = %group, piece = %named, "partitioned vertex group");
        outcome.created.push(named);
        targets.push(target);
        if let Some(id) = backup {
            backup_ops::set_pieces(scene, id, outcome.created.clone())?;
        }

        if !scene.has_object(object) {
            return Err(aborted(object, &group, "source object lost after separation"));
        }
    }

    scene.set_mode(Mode::Object)?;
    if scene.mesh_data(object)?.vertex_count() == 0 {
        scene.delete_object(object);
        // Pieces that collided with the source name can take it now
        for (piece, target) in outcome.created.iter_mut().zip(&targets) {
            if piece.as_str() != target.as_str() && !scene.has_object(target) {
                let renamed = scene.rename_object(piece.as_str(), target)?;
                scene.rename_data(&renamed, target)?;
                *piece = renamed;
            }
        }
    } else {
        tag_ops::mark(scene, &TagTarget::Object(object.to_string()))?;
        outcome.residual = Some(object.to_string());
    }
    if let Some(id) = backup {
        let pieces = outcome.created.iter().chain(&outcome.residual).cloned().collect();
        backup_ops::set_pieces(scene, id, pieces)?;
    }
    Ok(outcome)
}

/// Back up the active mesh, then partition it
///
/// `object` defaults to the active object.
///
/// # Errors
///
/// Returns `NoActiveObject`, `WrongObjectType`, `NoVertexGroups` or
/// `BackupAlreadyExists` before anything is touched; `PartitionAborted`
/// after.
pub fn separate_with_backup(scene: &mut Scene, object: Option<&str>) -> Result<Separation> {
    let object = match object {
        Some(name) => name.to_string(),
        None => scene.require_active()?,
    };
    if scene.mesh_data(&object)?.vertex_groups.is_empty() {
        return Err(QgsError::NoVertexGroups { object });
    }
    scene.set_mode(Mode::Object)?;

    let backup_id = backup_ops::capture(scene, &object)?;
    let outcome = partition_tracked(scene, &object, Some(&backup_id))?;
    Ok(Separation { backup_id, outcome })
}

/// Join every tagged mesh into one object named `name`
///
/// Returns the resulting object name, or `None` when no tagged mesh exists.
///
/// # Errors
///
/// Returns scene errors from selection or join.
pub fn rejoin(scene: &mut Scene, name: &str) -> Result<Option<String>> {
    let meshes = tag_ops::tagged_meshes(scene);
    rejoin_objects(scene, &meshes, name)
}

/// Join the existing mesh objects among `objects` into one named `name`
///
/// Names that no longer resolve to a mesh are ignored. The first remaining
/// object receives the others. Returns `None` when none remain.
///
/// # Errors
///
/// Returns scene errors from selection or join.
pub fn rejoin_objects(scene: &mut Scene, objects: &[String], name: &str) -> Result<Option<String>> {
    let meshes: Vec<String> = objects
        .iter()
        .filter(|o| scene.object_of_kind(o, ObjectKind::Mesh).is_ok())
        .cloned()
        .collect();
    let Some(first) = meshes.first().cloned() else {
        return Ok(None);
    };

    scene.set_mode(Mode::Object)?;
    if meshes.len() > 1 {
        scene.select_only(&meshes)?;
        scene.set_active(&first)?;
        scene.join_selected()?;
    }

    let named = scene.rename_object(&first, name)?;
    scene.rename_data(&named, name)?;
    scene.select_only([&named])?;
    scene.set_active(&named)?;
    tracing::debug!(object = %named, joined = meshes.len(), "rejoined meshes");
    Ok(Some(named))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeshData;
    use crate::ops::scene::SplitPolicy;
    use glam::Vec3;

    /// Strip of three quads; groups cover quads 0, 1 and an empty group
    fn strip() -> Scene {
        let mut vertices = Vec::new();
        for i in 0..4 {
            vertices.push(Vec3::new(i as f32, 0.0, 0.0));
            vertices.push(Vec3::new(i as f32, 1.0, 0.0));
        }
        let faces = vec![vec![0, 2, 3, 1], vec![2, 4, 5, 3], vec![4, 6, 7, 5]];
        let mut mesh = MeshData::with_geometry("Body", vertices, faces);
        let left = mesh.ensure_group("QGS_Left");
        for v in 0..4 {
            left.set_weight(v, 1.0);
        }
        let right = mesh.ensure_group("Right");
        for v in 4..8 {
            right.set_weight(v, 1.0);
        }
        mesh.ensure_group("Empty");

        let mut scene = Scene::new();
        scene.add_mesh_object("Body", mesh);
        scene.set_active("Body").unwrap();
        scene
    }

    #[test]
    fn test_partition_names_and_skips() {
        let mut scene = strip();
        let outcome = partition(&mut scene, "Body").unwrap();

        assert_eq!(outcome.created, vec!["Left", "Right"]);
        assert_eq!(outcome.skipped_groups, vec!["Empty"]);
        assert_eq!(outcome.residual, None);
        assert!(!scene.has_object("Body"));
        assert_eq!(scene.mode(), Mode::Object);
        assert!(tag_ops::is_tagged(&scene, &TagTarget::Object("Left".to_string())));
    }

    #[test]
    fn test_partition_keeps_residual() {
        let mut scene = strip();
        scene.mesh_data_mut("Body").unwrap().remove_group("Right");

        let outcome = partition(&mut scene, "Body").unwrap();

        assert_eq!(outcome.residual.as_deref(), Some("Body"));
        assert_eq!(scene.mesh_data("Body").unwrap().vertex_count(), 4);
    }

    #[test]
    fn test_partition_merges_fragments() {
        let mut scene = strip();
        scene.split_policy = SplitPolicy::LoosePieces;
        // No face lies wholly inside the group, so every vertex separates alone
        let mesh = scene.mesh_data_mut("Body").unwrap();
        mesh.vertex_groups.clear();
        let ends = mesh.ensure_group("Ends");
        for v in [0, 1, 6, 7] {
            ends.set_weight(v, 1.0);
        }

        let outcome = partition(&mut scene, "Body").unwrap();

        assert_eq!(outcome.created, vec!["Ends"]);
        assert_eq!(outcome.merged_fragments, 1);
        assert_eq!(scene.mesh_data("Ends").unwrap().vertex_count(), 4);
    }

    #[test]
    fn test_separate_requires_groups() {
        let mut scene = strip();
        scene.mesh_data_mut("Body").unwrap().vertex_groups.clear();
        assert!(matches!(
            separate_with_backup(&mut scene, None),
            Err(QgsError::NoVertexGroups { .. })
        ));
        assert!(backup_ops::current(&scene).unwrap().is_none());
    }

    #[test]
    fn test_rejoin_tagged_meshes() {
        let mut scene = strip();
        separate_with_backup(&mut scene, None).unwrap();

        let joined = rejoin(&mut scene, "Body").unwrap();

        assert_eq!(joined.as_deref(), Some("Body"));
        assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Body"]);
        assert_eq!(scene.mesh_data("Body").unwrap().vertex_count(), 8);
    }

    #[test]
    fn test_piece_named_like_source_takes_freed_name() {
        let mut scene = Scene::new();
        let mut mesh = MeshData::with_geometry("Barrel", vec![Vec3::ZERO, Vec3::X], vec![]);
        mesh.ensure_group("QGS_Barrel").set_weight(0, 1.0);
        mesh.ensure_group("QGS_Barrel").set_weight(1, 1.0);
        scene.add_mesh_object("Barrel", mesh);
        scene.set_active("Barrel").unwrap();

        let separation = separate_with_backup(&mut scene, None).unwrap();

        assert_eq!(separation.outcome.created, vec!["Barrel"]);
        assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Barrel"]);
        assert_eq!(scene.object("Barrel").unwrap().data, "Barrel");
        let record = backup_ops::current(&scene).unwrap().unwrap();
        assert_eq!(record.pieces, vec!["Barrel"]);
    }

    #[test]
    fn test_backup_lists_pieces_and_residual() {
        let mut scene = strip();
        scene.mesh_data_mut("Body").unwrap().remove_group("Right");

        separate_with_backup(&mut scene, None).unwrap();

        let record = backup_ops::current(&scene).unwrap().unwrap();
        assert_eq!(record.pieces, vec!["Left", "Body"]);
    }

    #[test]
    fn test_rejoin_objects_ignores_others() {
        let mut scene = strip();
        scene.add_mesh_object("Other", MeshData::with_geometry("Other", vec![Vec3::Z], vec![]));
        tag_ops::mark(&mut scene, &TagTarget::Object("Other".to_string())).unwrap();
        separate_with_backup(&mut scene, None).unwrap();

        let pieces = vec!["Left".to_string(), "Right".to_string(), "Gone".to_string()];
        let joined = rejoin_objects(&mut scene, &pieces, "Body").unwrap();

        assert_eq!(joined.as_deref(), Some("Body"));
        assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Body", "Other"]);
        assert_eq!(scene.mesh_data("Other").unwrap().vertex_count(), 1);
    }

    #[test]
    fn test_rejoin_without_tagged_meshes() {
        let mut scene = strip();
        assert_eq!(rejoin(&mut scene, "Body").unwrap(), None);
    }
}
