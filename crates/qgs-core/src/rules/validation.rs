use crate::errors::{QgsError, Result};
use crate::ops::scene::Scene;

use super::invariants;

/// Every invariant violation in the scene, as readable lines
///
/// Checks, in order:
///
/// 1. Objects reference existing data blocks
/// 2. Faces, UVs and vertex groups stay inside each vertex list
/// 3. Bone trees have no loops and no missing parents
/// 4. Armature modifiers target existing armatures
/// 5. Selection and active object name existing objects
/// 6. A live backup record points at an existing block
pub fn collect_violations(scene: &Scene) -> Vec<String> {
    let mut violations = Vec::new();

    for (object, data) in invariants::find_dangling_data(scene) {
        violations.push(format!("object {} uses missing data block {}", object, data));
    }

    for (mesh, problem) in invariants::find_out_of_range_indices(scene) {
        violations.push(format!("mesh {}: {}", mesh, problem));
    }

    for (armature, bone) in invariants::find_bone_cycles(scene) {
        violations.push(format!("armature {}: bone {} is on a parent loop", armature, bone));
    }
    for (armature, bone, parent) in invariants::find_missing_bone_parents(scene) {
        violations.push(format!(
            "armature {}: bone {} has missing parent {}",
            armature, bone, parent
        ));
    }

    for (object, modifier, target) in invariants::find_dangling_modifier_targets(scene) {
        violations.push(format!(
            "object {}: modifier {} targets missing armature {}",
            object, modifier, target
        ));
    }

    for name in invariants::find_stale_selection(scene) {
        violations.push(format!("selection references missing object {}", name));
    }

    if let Some(problem) = invariants::find_broken_backup(scene) {
        violations.push(problem);
    }

    violations
}

/// Validate the whole scene
///
/// # Errors
///
/// Returns `InvariantViolation` carrying the first violation found. Call
/// `collect_violations` for the full list.
pub fn validate_scene(scene: &Scene) -> Result<()> {
    match collect_violations(scene).into_iter().next() {
        Some(reason) => Err(QgsError::InvariantViolation { reason }),
        None => Ok(()),
    }
}
