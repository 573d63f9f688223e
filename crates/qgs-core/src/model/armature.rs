use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A bone in an armature's single-parent tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<String>,
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default)]
    pub selected: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            parent: None,
            head,
            tail,
            selected: false,
        }
    }
}

/// Armature data block: ordered bone list plus an optional active bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmatureData {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub active_bone: Option<String>,
}

impl ArmatureData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
            active_bone: None,
        }
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.name == name)
    }

    pub fn has_bone(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    pub fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }

    /// Selected bone names in list order
    pub fn selected_bones(&self) -> Vec<String> {
        self.bones
            .iter()
            .filter(|b| b.selected)
            .map(|b| b.name.clone())
            .collect()
    }

    /// Bone name not yet used in this armature, with `.001`-style suffixes
    pub fn unique_bone_name(&self, base: &str) -> String {
        if !self.has_bone(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}.{:03}", base, n))
            .find(|candidate| !self.has_bone(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Whether making `parent` the parent of `child` would close a loop
    ///
    /// True when `child == parent` or `child` is already an ancestor of
    /// `parent`. Walks at most `bones.len()` steps so a corrupt tree still
    /// terminates.
    pub fn would_create_cycle(&self, child: &str, parent: &str) -> bool {
        if child == parent {
            return true;
        }
        let mut current = self.bone(parent).and_then(|b| b.parent.clone());
        for _ in 0..self.bones.len() {
            match current {
                Some(ref name) if name == child => return true,
                Some(ref name) => current = self.bone(name).and_then(|b| b.parent.clone()),
                None => return false,
            }
        }
        true
    }
}
