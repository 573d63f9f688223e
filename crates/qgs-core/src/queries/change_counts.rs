use serde::{Deserialize, Serialize};

use crate::model::{ObjectKind, SceneObject};
use crate::ops::backup_ops;
use crate::ops::scene::Scene;
use crate::ops::tag_ops::{self, has_reserved_prefix};

/// How much tool-owned state a scene carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    /// Tagged objects of any kind
    pub tagged_objects: usize,
    pub armatures: usize,
    /// Bones inside tagged armatures
    pub bones: usize,
    /// Prefixed vertex groups across all meshes
    pub vertex_groups: usize,
    /// Prefixed modifiers across all objects
    pub modifiers: usize,
    pub pending_backup: bool,
}

impl ChangeCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for ChangeCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tagged objects, {} armatures, {} bones, {} vertex groups, {} modifiers",
            self.tagged_objects, self.armatures, self.bones, self.vertex_groups, self.modifiers
        )?;
        if self.pending_backup {
            write!(f, ", backup pending")?;
        }
        Ok(())
    }
}

/// Count tool-owned entities without changing anything
///
/// A slot that cannot be parsed still counts as a pending backup.
pub fn count_qgs_changes(scene: &Scene) -> ChangeCounts {
    let armatures = tag_ops::tagged_armatures(scene);
    let bones = armatures
        .iter()
        .filter_map(|name| scene.armature_data(name).ok())
        .map(|data| data.bones.len())
        .sum();

    let vertex_groups = scene
        .objects_of_kind(ObjectKind::Mesh)
        .iter()
        .filter_map(|name| scene.mesh_data(name).ok())
        .flat_map(|mesh| mesh.vertex_groups.iter())
        .filter(|g| has_reserved_prefix(&g.name))
        .count();

    let modifiers = scene
        .objects()
        .flat_map(|o: &SceneObject| o.modifiers.iter())
        .filter(|m| has_reserved_prefix(&m.name))
        .count();

    ChangeCounts {
        tagged_objects: tag_ops::sweep(scene, |_| true).len(),
        armatures: armatures.len(),
        bones,
        vertex_groups,
        modifiers,
        pending_backup: scene.props.contains_key(backup_ops::BACKUP_SLOT_KEY),
    }
}
