//! Bone Parent History
//!
//! Reparent/unparent of selected bones with one level of undo per bone. The
//! undo entries live in an explicit table keyed by `(armature, bone)`; a
//! second reparent or unparent of the same bone overwrites its entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scene::Scene;
use crate::errors::{QgsError, Result};
use crate::model::{Mode, ObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Reparent,
    Unparent,
}

/// What a bone's parent was before the last reparent/unparent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentHistoryEntry {
    pub kind: HistoryKind,
    pub previous_parent: Option<String>,
}

/// Single-slot undo table: armature object → bone → entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneParentHistory {
    #[serde(default)]
    entries: BTreeMap<String, BTreeMap<String, ParentHistoryEntry>>,
}

impl BoneParentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry, replacing any previous one for the bone
    pub fn record(&mut self, armature: &str, bone: &str, entry: ParentHistoryEntry) {
        self.entries
            .entry(armature.to_string())
            .or_default()
            .insert(bone.to_string(), entry);
    }

    pub fn entry(&self, armature: &str, bone: &str) -> Option<&ParentHistoryEntry> {
        self.entries.get(armature).and_then(|bones| bones.get(bone))
    }

    /// Remove and return the entry for a bone
    pub fn take(&mut self, armature: &str, bone: &str) -> Option<ParentHistoryEntry> {
        let bones = self.entries.get_mut(armature)?;
        let entry = bones.remove(bone);
        if bones.is_empty() {
            self.entries.remove(armature);
        }
        entry
    }

    /// Drop every entry of an armature; returns how many were dropped
    pub fn forget_armature(&mut self, armature: &str) -> usize {
        self.entries.remove(armature).map_or(0, |bones| bones.len())
    }

    /// Drop entries of armature objects that no longer exist in `scene`
    pub fn forget_missing(&mut self, scene: &Scene) -> usize {
        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|armature| {
                scene
                    .object_of_kind(armature, ObjectKind::Armature)
                    .is_err()
            })
            .cloned()
            .collect();
        gone.iter().map(|armature| self.forget_armature(armature)).sum()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReparentSummary {
    pub parent: String,
    pub reparented: Vec<String>,
    /// Bones left alone because the active bone descends from them
    pub skipped_cycles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparentSummary {
    pub unparented: Vec<String>,
    pub already_parentless: usize,
}

/// Outcome of reversing one bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverseStatus {
    /// Parent was restored to a different value
    Changed,
    /// Entry consumed but the parent was already the recorded one
    Unchanged,
    /// Bone had no entry
    NoHistory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub no_history: usize,
}

/// Armature must be the active object and the scene in Edit mode
fn require_edit_armature(scene: &Scene, armature: &str) -> Result<()> {
    scene.object_of_kind(armature, ObjectKind::Armature)?;
    if scene.active() != Some(armature) {
        return Err(QgsError::NotActive {
            name: armature.to_string(),
        });
    }
    scene.require_mode(Mode::Edit)
}

/// Parent every other selected bone to the active bone
///
/// # Errors
///
/// Returns `NotActive`, `WrongMode`, `NoActiveBone` (none set or not selected)
/// or `InsufficientSelection` with fewer than two selected bones.
pub fn reparent(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    armature: &str,
) -> Result<ReparentSummary> {
    require_edit_armature(scene, armature)?;
    let data = scene.armature_data(armature)?;
    let selected = data.selected_bones();
    let parent = data
        .active_bone
        .clone()
        .filter(|active| selected.contains(active))
        .ok_or_else(|| QgsError::NoActiveBone {
            armature: armature.to_string(),
        })?;
    if selected.len() < 2 {
        return Err(QgsError::InsufficientSelection {
            what: "bones".to_string(),
            required: 2,
            found: selected.len(),
        });
    }

    let mut summary = ReparentSummary {
        parent: parent.clone(),
        ..Default::default()
    };
    for bone in selected.into_iter().filter(|b| *b != parent) {
        let data = scene.armature_data(armature)?;
        if data.would_create_cycle(&bone, &parent) {
            summary.skipped_cycles.push(bone);
            continue;
        }
        let previous_parent = data.bone(&bone).and_then(|b| b.parent.clone());
        scene.set_bone_parent(armature, &bone, Some(&parent))?;
        history.record(
            armature,
            &bone,
            ParentHistoryEntry {
                kind: HistoryKind::Reparent,
                previous_parent,
            },
        );
        summary.reparented.push(bone);
    }

    tracing::debug!(
        armature,
        parent = %summary.parent,
        reparented = summary.reparented.len(),
        skipped = summary.skipped_cycles.len(),
        "reparented bones"
    );
    Ok(summary)
}

/// Clear the parent of every selected bone that has one
///
/// # Errors
///
/// Returns `NotActive`, `WrongMode` or `EmptySelection`.
pub fn unparent(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    armature: &str,
) -> Result<UnparentSummary> {
    require_edit_armature(scene, armature)?;
    let selected = scene.armature_data(armature)?.selected_bones();
    if selected.is_empty() {
        return Err(QgsError::EmptySelection {
            what: "bones".to_string(),
        });
    }

    let mut summary = UnparentSummary::default();
    for bone in selected {
        let previous_parent = scene
            .armature_data(armature)?
            .bone(&bone)
            .and_then(|b| b.parent.clone());
        if previous_parent.is_none() {
            summary.already_parentless += 1;
            continue;
        }
        scene.set_bone_parent(armature, &bone, None)?;
        history.record(
            armature,
            &bone,
            ParentHistoryEntry {
                kind: HistoryKind::Unparent,
                previous_parent,
            },
        );
        summary.unparented.push(bone);
    }
    Ok(summary)
}

/// Restore the recorded parent of one bone and consume its entry
///
/// A recorded parent that no longer exists, or that would now close a loop,
/// leaves the bone parentless.
///
/// # Errors
///
/// Returns `NotActive`, `WrongMode` or `BoneNotFound`.
pub fn reverse_bone(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    armature: &str,
    bone: &str,
) -> Result<ReverseStatus> {
    require_edit_armature(scene, armature)?;
    let data = scene.armature_data(armature)?;
    let current = data
        .bone(bone)
        .ok_or_else(|| QgsError::BoneNotFound {
            armature: armature.to_string(),
            bone: bone.to_string(),
        })?
        .parent
        .clone();

    let Some(entry) = history.take(armature, bone) else {
        return Ok(ReverseStatus::NoHistory);
    };
    let restored = entry
        .previous_parent
        .filter(|p| data.has_bone(p) && !data.would_create_cycle(bone, p));

    if restored == current {
        return Ok(ReverseStatus::Unchanged);
    }
    scene.set_bone_parent(armature, bone, restored.as_deref())?;
    Ok(ReverseStatus::Changed)
}

/// Reverse every selected bone
///
/// # Errors
///
/// Returns `NotActive`, `WrongMode` or `EmptySelection`.
pub fn reverse(
    scene: &mut Scene,
    history: &mut BoneParentHistory,
    armature: &str,
) -> Result<ReverseSummary> {
    require_edit_armature(scene, armature)?;
    let selected = scene.armature_data(armature)?.selected_bones();
    if selected.is_empty() {
        return Err(QgsError::EmptySelection {
            what: "bones".to_string(),
        });
    }

    let mut summary = ReverseSummary::default();
    for bone in &selected {
        match reverse_bone(scene, history, armature, bone)? {
            ReverseStatus::Changed => summary.changed += 1,
            ReverseStatus::Unchanged => summary.unchanged += 1,
            ReverseStatus::NoHistory => summary.no_history += 1,
        }
    }
    Ok(summary)
}
