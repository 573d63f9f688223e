//! Tag Registry
//!
//! Ownership markers for everything the tool creates. Objects carry the
//! boolean custom property [`TAG_KEY`]; named sub-resources (vertex groups,
//! modifiers, armature data) carry [`RESERVED_PREFIX`] in their name.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::scene::Scene;
use crate::errors::{QgsError, Result};
use crate::model::{ObjectKind, SceneObject};

/// Object custom property marking tool ownership
pub const TAG_KEY: &str = "QGS";

/// Name prefix marking tool-owned sub-resources
pub const RESERVED_PREFIX: &str = "QGS_";

/// Name of the armature modifier the tool adds to rigged meshes
pub const ARMATURE_MODIFIER_NAME: &str = "QGS_Armature";

/// Something the registry can mark, query, or clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagTarget {
    Object(String),
    VertexGroup { object: String, group: String },
    Modifier { object: String, modifier: String },
    /// The data block of an armature object
    ArmatureData(String),
}

/// Per-class counters reported by `clear` and `clear_all`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCounts {
    pub objects_deleted: usize,
    pub tags_removed: usize,
    pub vertex_groups_removed: usize,
    pub modifiers_removed: usize,
    /// Bones that went away with a deleted armature data block
    pub bones_removed: usize,
}

impl ClearCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for ClearCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.objects_deleted += rhs.objects_deleted;
        self.tags_removed += rhs.tags_removed;
        self.vertex_groups_removed += rhs.vertex_groups_removed;
        self.modifiers_removed += rhs.modifiers_removed;
        self.bones_removed += rhs.bones_removed;
    }
}

impl std::fmt::Display for ClearCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} objects deleted, {} tags, {} vertex groups, {} modifiers, {} bones removed",
            self.objects_deleted,
            self.tags_removed,
            self.vertex_groups_removed,
            self.modifiers_removed,
            self.bones_removed
        )
    }
}

pub fn has_reserved_prefix(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// `name` with the reserved prefix added (unchanged if already present)
pub fn with_prefix(name: &str) -> String {
    if has_reserved_prefix(name) {
        name.to_string()
    } else {
        format!("{}{}", RESERVED_PREFIX, name)
    }
}

/// `name` with the reserved prefix removed (unchanged if absent)
pub fn strip_prefix(name: &str) -> &str {
    name.strip_prefix(RESERVED_PREFIX).unwrap_or(name)
}

/// Mark a target as tool-owned
///
/// # Errors
///
/// Returns `ObjectNotFound`, `VertexGroupNotFound`, `WrongObjectType`, or
/// `InvariantViolation` when the prefixed name is already taken by a sibling.
pub fn mark(scene: &mut Scene, target: &TagTarget) -> Result<()> {
    match target {
        TagTarget::Object(name) => {
            scene.object_mut(name)?.props.set(TAG_KEY, Value::Bool(true));
        }
        TagTarget::VertexGroup { object, group } => {
            let mesh = scene.mesh_data_mut(object)?;
            let prefixed = with_prefix(group);
            if prefixed != *group && mesh.group(&prefixed).is_some() {
                return Err(QgsError::InvariantViolation {
                    reason: format!("vertex group {} already exists on {}", prefixed, object),
                });
            }
            let vg = mesh
                .group_mut(group)
                .ok_or_else(|| QgsError::VertexGroupNotFound {
                    object: object.clone(),
                    group: group.clone(),
                })?;
            vg.name = prefixed;
        }
        TagTarget::Modifier { object, modifier } => {
            let obj = scene.object_mut(object)?;
            let prefixed = with_prefix(modifier);
            if prefixed != *modifier && obj.modifier(&prefixed).is_some() {
                return Err(QgsError::InvariantViolation {
                    reason: format!("modifier {} already exists on {}", prefixed, object),
                });
            }
            let m = obj
                .modifiers
                .iter_mut()
                .find(|m| m.name == *modifier)
                .ok_or_else(|| QgsError::InvariantViolation {
                    reason: format!("modifier {} not found on {}", modifier, object),
                })?;
            m.name = prefixed;
        }
        TagTarget::ArmatureData(object) => {
            let data = scene.armature_data(object)?.name.clone();
            scene.rename_data(object, &with_prefix(&data))?;
        }
    }
    Ok(())
}

/// Whether an object belongs to the tool
///
/// The single ownership predicate. A mesh is tagged when it carries the tag
/// property, any vertex group with the reserved prefix, or the reserved
/// armature modifier. An armature is tagged by the property or by a prefixed
/// data block name.
pub fn is_object_tagged(scene: &Scene, object: &SceneObject) -> bool {
    if object.props.get_bool(TAG_KEY) == Some(true) {
        return true;
    }
    match object.kind {
        ObjectKind::Mesh => {
            object.modifier(ARMATURE_MODIFIER_NAME).is_some()
                || scene.mesh_block(&object.data).is_some_and(|mesh| {
                    mesh.vertex_groups
                        .iter()
                        .any(|g| has_reserved_prefix(&g.name))
                })
        }
        ObjectKind::Armature => has_reserved_prefix(&object.data),
    }
}

/// Whether a target is tool-owned; missing targets read as untagged
pub fn is_tagged(scene: &Scene, target: &TagTarget) -> bool {
    match target {
        TagTarget::Object(name) => scene
            .object(name)
            .is_ok_and(|object| is_object_tagged(scene, object)),
        TagTarget::VertexGroup { object, group } => {
            has_reserved_prefix(group)
                && scene
                    .mesh_data(object)
                    .is_ok_and(|mesh| mesh.group(group).is_some())
        }
        TagTarget::Modifier { object, modifier } => {
            has_reserved_prefix(modifier)
                && scene
                    .object(object)
                    .is_ok_and(|o| o.modifier(modifier).is_some())
        }
        TagTarget::ArmatureData(object) => scene
            .armature_data(object)
            .is_ok_and(|data| has_reserved_prefix(&data.name)),
    }
}

/// Names of tagged objects accepted by `predicate`, sorted
pub fn sweep(scene: &Scene, predicate: impl Fn(&SceneObject) -> bool) -> Vec<String> {
    scene
        .objects()
        .filter(|o| is_object_tagged(scene, o) && predicate(o))
        .map(|o| o.name.clone())
        .collect()
}

/// Tagged mesh object names, sorted
pub fn tagged_meshes(scene: &Scene) -> Vec<String> {
    sweep(scene, SceneObject::is_mesh)
}

/// Tagged armature object names, sorted
pub fn tagged_armatures(scene: &Scene) -> Vec<String> {
    sweep(scene, SceneObject::is_armature)
}

/// Remove tool ownership from a target
///
/// Armature objects are deleted. Mesh objects lose the tag, every prefixed
/// vertex group and every prefixed modifier; without `keep_node` the mesh
/// object is deleted as well. Named sub-resources are removed when they carry
/// the prefix. Missing targets are a no-op.
pub fn clear(scene: &mut Scene, target: &TagTarget, keep_node: bool) -> ClearCounts {
    let mut counts = ClearCounts::default();
    match target {
        TagTarget::Object(name) | TagTarget::ArmatureData(name) => {
            let Ok(kind) = scene.object(name).map(|o| o.kind) else {
                return counts;
            };
            match kind {
                ObjectKind::Armature => counts += delete_armature(scene, name),
                ObjectKind::Mesh => {
                    counts += strip_mesh(scene, name);
                    if !keep_node && scene.delete_object(name) {
                        counts.objects_deleted += 1;
                    }
                }
            }
        }
        TagTarget::VertexGroup { object, group } => {
            if has_reserved_prefix(group) {
                if let Ok(mesh) = scene.mesh_data_mut(object) {
                    if mesh.remove_group(group) {
                        counts.vertex_groups_removed += 1;
                    }
                }
            }
        }
        TagTarget::Modifier { object, modifier } => {
            if has_reserved_prefix(modifier) {
                if let Ok(obj) = scene.object_mut(object) {
                    if obj.remove_modifier(modifier) {
                        counts.modifiers_removed += 1;
                    }
                }
            }
        }
    }
    counts
}

fn delete_armature(scene: &mut Scene, name: &str) -> ClearCounts {
    let mut counts = ClearCounts::default();
    let Ok(data) = scene.object(name).map(|o| o.data.clone()) else {
        return counts;
    };
    let bones = scene.armature_block(&data).map_or(0, |a| a.bones.len());
    if scene.delete_object(name) {
        counts.objects_deleted += 1;
        if scene.armature_block(&data).is_none() {
            counts.bones_removed += bones;
        }
    }
    counts
}

fn strip_mesh(scene: &mut Scene, name: &str) -> ClearCounts {
    let mut counts = ClearCounts::default();
    if let Ok(object) = scene.object_mut(name) {
        if object.props.remove(TAG_KEY).is_some() {
            counts.tags_removed += 1;
        }
        let before = object.modifiers.len();
        object.modifiers.retain(|m| !has_reserved_prefix(&m.name));
        counts.modifiers_removed += before - object.modifiers.len();
    }
    if let Ok(mesh) = scene.mesh_data_mut(name) {
        let before = mesh.vertex_groups.len();
        mesh.vertex_groups.retain(|g| !has_reserved_prefix(&g.name));
        counts.vertex_groups_removed += before - mesh.vertex_groups.len();
    }
    counts
}

/// Clear every tool-owned entity in the scene
///
/// Tagged armatures are deleted; meshes are stripped and kept. Running it a
/// second time removes nothing.
pub fn clear_all(scene: &mut Scene) -> ClearCounts {
    let mut counts = ClearCounts::default();
    for name in tagged_armatures(scene) {
        counts += delete_armature(scene, &name);
    }
    for name in scene.objects_of_kind(ObjectKind::Mesh) {
        counts += strip_mesh(scene, &name);
    }
    tracing::debug!(%counts, "cleared all tags");
    counts
}
