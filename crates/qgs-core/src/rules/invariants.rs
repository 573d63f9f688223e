use std::collections::BTreeSet;

use crate::model::{ArmatureData, ObjectKind};
use crate::ops::backup_ops;
use crate::ops::scene::Scene;

/// Check if a bone sits on a loop in its parent chain
pub fn has_bone_cycle(armature: &ArmatureData, bone: &str) -> bool {
    let mut visited = BTreeSet::new();
    let mut current = Some(bone);

    while let Some(name) = current {
        if !visited.insert(name) {
            return true;
        }
        current = armature.bone(name).and_then(|b| b.parent.as_deref());
    }

    false
}

/// Bones on a parent loop
///
/// Returns list of (armature data, bone) tuples
pub fn find_bone_cycles(scene: &Scene) -> Vec<(String, String)> {
    scene
        .armatures
        .values()
        .flat_map(|arm| {
            arm.bones
                .iter()
                .filter(|b| has_bone_cycle(arm, &b.name))
                .map(|b| (arm.name.clone(), b.name.clone()))
        })
        .collect()
}

/// Bones whose parent name does not exist in the same armature
///
/// Returns list of (armature data, bone, parent) tuples
pub fn find_missing_bone_parents(scene: &Scene) -> Vec<(String, String, String)> {
    let mut missing = Vec::new();
    for arm in scene.armatures.values() {
        for bone in &arm.bones {
            if let Some(ref parent) = bone.parent {
                if !arm.has_bone(parent) {
                    missing.push((arm.name.clone(), bone.name.clone(), parent.clone()));
                }
            }
        }
    }
    missing
}

/// Objects pointing at a data block that does not exist
///
/// Returns list of (object, data) tuples
pub fn find_dangling_data(scene: &Scene) -> Vec<(String, String)> {
    scene
        .objects()
        .filter(|o| match o.kind {
            ObjectKind::Mesh => scene.mesh_block(&o.data).is_none(),
            ObjectKind::Armature => scene.armature_block(&o.data).is_none(),
        })
        .map(|o| (o.name.clone(), o.data.clone()))
        .collect()
}

/// Mesh blocks whose faces, UVs or vertex groups index past the vertex list
///
/// Returns list of (mesh data, description) tuples
pub fn find_out_of_range_indices(scene: &Scene) -> Vec<(String, String)> {
    let mut bad = Vec::new();
    for mesh in scene.meshes.values() {
        let count = mesh.vertex_count() as u32;
        if mesh.faces.iter().flatten().any(|&v| v >= count) {
            bad.push((mesh.name.clone(), "face index out of range".to_string()));
        }
        if !mesh.uvs.is_empty() && mesh.uvs.len() != mesh.vertex_count() {
            bad.push((mesh.name.clone(), "uv count does not match vertex count".to_string()));
        }
        for group in &mesh.vertex_groups {
            if group.weights.keys().any(|&v| v >= count) {
                bad.push((
                    mesh.name.clone(),
                    format!("vertex group {} indexes past the vertex list", group.name),
                ));
            }
        }
    }
    bad
}

/// Selected or active names with no object behind them
pub fn find_stale_selection(scene: &Scene) -> Vec<String> {
    scene
        .selection
        .iter()
        .chain(scene.active.iter())
        .filter(|name| !scene.has_object(name))
        .cloned()
        .collect()
}

/// Modifiers targeting an object that is not an armature in the scene
///
/// Returns list of (object, modifier, target) tuples
pub fn find_dangling_modifier_targets(scene: &Scene) -> Vec<(String, String, String)> {
    let mut dangling = Vec::new();
    for object in scene.objects() {
        for modifier in &object.modifiers {
            if let Some(target) = modifier.armature_target() {
                if scene.object_of_kind(target, ObjectKind::Armature).is_err() {
                    dangling.push((
                        object.name.clone(),
                        modifier.name.clone(),
                        target.to_string(),
                    ));
                }
            }
        }
    }
    dangling
}

/// Describe a backup slot that cannot be restored, if any
pub fn find_broken_backup(scene: &Scene) -> Option<String> {
    match backup_ops::current(scene) {
        Err(err) => Some(format!("backup slot unreadable: {}", err)),
        Ok(Some(record)) if scene.mesh_block(record.id.as_str()).is_none() => {
            Some(format!("backup block {} is missing", record.id))
        }
        Ok(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bone, MeshData};
    use glam::Vec3;

    #[test]
    fn test_has_bone_cycle() {
        let mut arm = ArmatureData::new("Rig");
        let mut a = Bone::new("a", Vec3::ZERO, Vec3::Z);
        let mut b = Bone::new("b", Vec3::ZERO, Vec3::Z);
        a.parent = Some("b".to_string());
        b.parent = Some("a".to_string());
        arm.bones = vec![a, b, Bone::new("c", Vec3::ZERO, Vec3::Z)];

        assert!(has_bone_cycle(&arm, "a"));
        assert!(!has_bone_cycle(&arm, "c"));
    }

    #[test]
    fn test_find_out_of_range_indices() {
        let mut scene = Scene::new();
        let mut mesh = MeshData::with_geometry("M", vec![Vec3::ZERO], vec![vec![0, 1, 2]]);
        mesh.ensure_group("g").set_weight(5, 1.0);
        scene.add_mesh_object("M", mesh);

        let bad = find_out_of_range_indices(&scene);
        assert_eq!(bad.len(), 2);
    }

    #[test]
    fn test_find_broken_backup() {
        let mut scene = Scene::new();
        assert!(find_broken_backup(&scene).is_none());
        scene
            .props
            .set(backup_ops::BACKUP_SLOT_KEY, serde_json::json!({"id": 1}));
        assert!(find_broken_backup(&scene).is_some());
    }
}
