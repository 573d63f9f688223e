use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bone_ops::BoneParentHistory;
use super::scene::Scene;
use super::tag_ops::{self, ClearCounts, TagTarget, ARMATURE_MODIFIER_NAME};
use crate::config::ToolConfig;
use crate::errors::{QgsError, Result};
use crate::model::{ArmatureData, Bone, Mode, Modifier, ObjectKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigSummary {
    pub armature: String,
    /// Bone names, one per rigged mesh
    pub bones: Vec<String>,
    /// What was cleared from a previous run
    pub cleared: ClearCounts,
}

/// Build a tagged armature with one bone per selected mesh
///
/// All previous tool state is cleared first. Each selected mesh gets a bone
/// at its location, a `QGS_<mesh>` vertex group weighting every vertex 1.0,
/// the reserved armature modifier, and the tag. The armature ends up active
/// and selected.
///
/// # Errors
///
/// Returns `WrongMode` outside Object mode and `EmptySelection` when no mesh
/// is selected. Nothing is changed in either case.
pub fn create_rig(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    config: &ToolConfig,
) -> Result<RigSummary> {
    scene.require_mode(Mode::Object)?;
    let meshes: Vec<String> = scene
        .selected_objects()
        .into_iter()
        .filter(|name| scene.object_of_kind(name, ObjectKind::Mesh).is_ok())
        .collect();
    if meshes.is_empty() {
        return Err(QgsError::EmptySelection {
            what: "mesh objects".to_string(),
        });
    }

    let cleared = tag_ops::clear_all(scene);
    history.forget_missing(scene);

    let armature_name = tag_ops::with_prefix(&config.armature_name);
    let armature = scene.add_armature_object(&armature_name, ArmatureData::new(&armature_name));
    tag_ops::mark(scene, &TagTarget::Object(armature.clone()))?;

    let mut bones = Vec::with_capacity(meshes.len());
    for mesh in &meshes {
        let head = scene.object(mesh)?.transform.location;
        let tail = head + Vec3::Z * config.bone_length;
        bones.push(scene.add_bone(&armature, Bone::new(mesh.as_str(), head, tail))?);

        let data = scene.mesh_data_mut(mesh)?;
        let vertex_count = data.vertex_count() as u32;
        let group = data.ensure_group(&tag_ops::with_prefix(mesh));
        for v in 0..vertex_count {
            group.set_weight(v, 1.0);
        }

        let object = scene.object_mut(mesh)?;
        object.remove_modifier(ARMATURE_MODIFIER_NAME);
        object
            .modifiers
            .push(Modifier::armature(ARMATURE_MODIFIER_NAME, Some(armature.clone())));
        tag_ops::mark(scene, &TagTarget::Object(mesh.clone()))?;
    }

    scene.select_only([&armature])?;
    scene.set_active(&armature)?;
    tracing::debug!(armature = %armature, bones = bones.len(), "created rig");
    Ok(RigSummary {
        armature,
        bones,
        cleared,
    })
}
