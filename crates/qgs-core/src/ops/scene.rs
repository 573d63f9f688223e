use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{QgsError, Result};
use crate::model::{ArmatureData, Bone, CustomProps, MeshData, Mode, ObjectKind, SceneObject};

/// Collection new objects are linked into
pub const DEFAULT_COLLECTION: &str = "Collection";

/// How `separate_selected` splits the edit selection into objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// One new object for the whole selection
    #[default]
    Single,
    /// One new object per connected piece of the selection
    LoosePieces,
}

/// In-memory host scene
///
/// Objects, data blocks, selection and mode. Every entity is addressed by
/// name; callers re-resolve by name after any structural edit instead of
/// holding references. Not thread-safe, designed for single-threaded use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub(crate) objects: BTreeMap<String, SceneObject>,
    #[serde(default)]
    pub(crate) meshes: BTreeMap<String, MeshData>,
    #[serde(default)]
    pub(crate) armatures: BTreeMap<String, ArmatureData>,
    #[serde(default)]
    pub(crate) selection: BTreeSet<String>,
    #[serde(default)]
    pub(crate) active: Option<String>,
    #[serde(default)]
    pub(crate) mode: Mode,
    /// Selected vertex indices of the active mesh while in Edit mode
    #[serde(default)]
    pub(crate) edit_selection: BTreeSet<u32>,
    /// Scene-level custom properties
    #[serde(default)]
    pub props: CustomProps,
    #[serde(default)]
    pub split_policy: SplitPolicy,
}

/// Pick `base` or the first free `.001`-style variant of it
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let stem = match base.rsplit_once('.') {
        Some((stem, digits)) if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) => {
            stem
        }
        _ => base,
    };
    (1u32..)
        .map(|n| format!("{}.{:03}", stem, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Objects =====

    /// Add a mesh object with its own data block; returns the object name
    ///
    /// Object and data names get a numeric suffix on collision.
    pub fn add_mesh_object(&mut self, name: &str, mut mesh: MeshData) -> String {
        let data_name = unique_name(&mesh.name, |n| self.meshes.contains_key(n));
        mesh.name = data_name.clone();
        self.meshes.insert(data_name.clone(), mesh);
        self.insert_object(name, ObjectKind::Mesh, data_name)
    }

    /// Add an armature object with its own data block; returns the object name
    pub fn add_armature_object(&mut self, name: &str, mut armature: ArmatureData) -> String {
        let data_name = unique_name(&armature.name, |n| self.armatures.contains_key(n));
        armature.name = data_name.clone();
        self.armatures.insert(data_name.clone(), armature);
        self.insert_object(name, ObjectKind::Armature, data_name)
    }

    fn insert_object(&mut self, name: &str, kind: ObjectKind, data: String) -> String {
        let object_name = unique_name(name, |n| self.objects.contains_key(n));
        let mut object = SceneObject::new(object_name.clone(), kind, data);
        object.collections.push(DEFAULT_COLLECTION.to_string());
        self.objects.insert(object_name.clone(), object);
        object_name
    }

    /// Get an object by name
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if no object has this name.
    pub fn object(&self, name: &str) -> Result<&SceneObject> {
        self.objects
            .get(name)
            .ok_or_else(|| QgsError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    /// Get a mutable object by name
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if no object has this name.
    pub fn object_mut(&mut self, name: &str) -> Result<&mut SceneObject> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| QgsError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// All object names, sorted
    pub fn object_names(&self) -> BTreeSet<String> {
        self.objects.keys().cloned().collect()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Names of objects of the given kind, sorted
    pub fn objects_of_kind(&self, kind: ObjectKind) -> Vec<String> {
        self.objects
            .values()
            .filter(|o| o.kind == kind)
            .map(|o| o.name.clone())
            .collect()
    }

    /// Get an object and check its kind
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` or `WrongObjectType`.
    pub fn object_of_kind(&self, name: &str, kind: ObjectKind) -> Result<&SceneObject> {
        let object = self.object(name)?;
        if object.kind != kind {
            return Err(QgsError::WrongObjectType {
                name: name.to_string(),
                expected: kind,
                found: object.kind,
            });
        }
        Ok(object)
    }

    /// Mesh data of a mesh object
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn mesh_data(&self, object: &str) -> Result<&MeshData> {
        let data = &self.object_of_kind(object, ObjectKind::Mesh)?.data;
        self.meshes
            .get(data)
            .ok_or_else(|| QgsError::DataNotFound { name: data.clone() })
    }

    /// Mutable mesh data of a mesh object
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn mesh_data_mut(&mut self, object: &str) -> Result<&mut MeshData> {
        let data = self.object_of_kind(object, ObjectKind::Mesh)?.data.clone();
        self.meshes
            .get_mut(&data)
            .ok_or(QgsError::DataNotFound { name: data })
    }

    /// Armature data of an armature object
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn armature_data(&self, object: &str) -> Result<&ArmatureData> {
        let data = &self.object_of_kind(object, ObjectKind::Armature)?.data;
        self.armatures
            .get(data)
            .ok_or_else(|| QgsError::DataNotFound { name: data.clone() })
    }

    /// Mutable armature data of an armature object
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn armature_data_mut(&mut self, object: &str) -> Result<&mut ArmatureData> {
        let data = self.object_of_kind(object, ObjectKind::Armature)?.data.clone();
        self.armatures
            .get_mut(&data)
            .ok_or(QgsError::DataNotFound { name: data })
    }

    /// Rename an object; returns the name actually assigned
    ///
    /// Selection, active object and armature modifier targets follow the
    /// rename.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if `old` does not exist.
    pub fn rename_object(&mut self, old: &str, new: &str) -> Result<String> {
        if old == new {
            self.object(old)?;
            return Ok(old.to_string());
        }
        let mut object = self
            .objects
            .remove(old)
            .ok_or_else(|| QgsError::ObjectNotFound {
                name: old.to_string(),
            })?;
        let assigned = unique_name(new, |n| self.objects.contains_key(n));
        object.name = assigned.clone();
        self.objects.insert(assigned.clone(), object);

        if self.selection.remove(old) {
            self.selection.insert(assigned.clone());
        }
        if self.active.as_deref() == Some(old) {
            self.active = Some(assigned.clone());
        }
        self.retarget_modifiers(old, Some(&assigned));
        Ok(assigned)
    }

    fn retarget_modifiers(&mut self, from: &str, to: Option<&str>) {
        for object in self.objects.values_mut() {
            for modifier in &mut object.modifiers {
                let crate::model::ModifierKind::Armature { target } = &mut modifier.kind;
                if target.as_deref() == Some(from) {
                    *target = to.map(str::to_string);
                }
            }
        }
    }

    /// Rename the data block of an object; returns the name actually assigned
    ///
    /// Every object sharing the block follows the rename.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` or `DataNotFound`.
    pub fn rename_data(&mut self, object: &str, new: &str) -> Result<String> {
        let (kind, old) = {
            let o = self.object(object)?;
            (o.kind, o.data.clone())
        };
        if old == new {
            return Ok(old);
        }
        let assigned = match kind {
            ObjectKind::Mesh => {
                let mut block = self
                    .meshes
                    .remove(&old)
                    .ok_or_else(|| QgsError::DataNotFound { name: old.clone() })?;
                let assigned = unique_name(new, |n| self.meshes.contains_key(n));
                block.name = assigned.clone();
                self.meshes.insert(assigned.clone(), block);
                assigned
            }
            ObjectKind::Armature => {
                let mut block = self
                    .armatures
                    .remove(&old)
                    .ok_or_else(|| QgsError::DataNotFound { name: old.clone() })?;
                let assigned = unique_name(new, |n| self.armatures.contains_key(n));
                block.name = assigned.clone();
                self.armatures.insert(assigned.clone(), block);
                assigned
            }
        };
        for o in self.objects.values_mut() {
            if o.kind == kind && o.data == old {
                o.data = assigned.clone();
            }
        }
        Ok(assigned)
    }

    /// Delete an object; returns `false` if it did not exist
    ///
    /// Unlinks it from every collection, clears it from selection and active,
    /// and drops its data block once no other object uses it.
    pub fn delete_object(&mut self, name: &str) -> bool {
        let Some(object) = self.objects.remove(name) else {
            return false;
        };
        self.selection.remove(name);
        if self.active.as_deref() == Some(name) {
            self.active = None;
            if self.mode != Mode::Object {
                self.mode = Mode::Object;
                self.edit_selection.clear();
            }
        }
        self.retarget_modifiers(name, None);
        self.drop_if_orphan(object.kind, &object.data);
        true
    }

    /// Number of objects using a data block
    pub fn data_users(&self, kind: ObjectKind, data: &str) -> usize {
        self.objects
            .values()
            .filter(|o| o.kind == kind && o.data == data)
            .count()
    }

    fn drop_if_orphan(&mut self, kind: ObjectKind, data: &str) -> bool {
        if self.data_users(kind, data) > 0 {
            return false;
        }
        match kind {
            ObjectKind::Mesh => self.meshes.remove(data).is_some(),
            ObjectKind::Armature => self.armatures.remove(data).is_some(),
        }
    }

    // ===== Data blocks =====

    /// Mesh data block by its own name (orphans included)
    pub fn mesh_block(&self, data: &str) -> Option<&MeshData> {
        self.meshes.get(data)
    }

    /// Armature data block by its own name
    pub fn armature_block(&self, data: &str) -> Option<&ArmatureData> {
        self.armatures.get(data)
    }

    /// Mesh data block names, sorted
    pub fn mesh_block_names(&self) -> Vec<String> {
        self.meshes.keys().cloned().collect()
    }

    /// Copy a mesh data block into a new orphan block; returns its name
    ///
    /// # Errors
    ///
    /// Returns `DataNotFound` if `data` does not exist.
    pub fn duplicate_mesh_data(&mut self, data: &str, new_name: &str) -> Result<String> {
        let mut copy = self
            .meshes
            .get(data)
            .cloned()
            .ok_or_else(|| QgsError::DataNotFound {
                name: data.to_string(),
            })?;
        let assigned = unique_name(new_name, |n| self.meshes.contains_key(n));
        copy.name = assigned.clone();
        self.meshes.insert(assigned.clone(), copy);
        Ok(assigned)
    }

    /// Point a mesh object at another mesh data block
    ///
    /// The previous block is dropped if this leaves it without users.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn set_object_data(&mut self, object: &str, data: &str) -> Result<()> {
        if !self.meshes.contains_key(data) {
            return Err(QgsError::DataNotFound {
                name: data.to_string(),
            });
        }
        self.object_of_kind(object, ObjectKind::Mesh)?;
        let previous = {
            let o = self.object_mut(object)?;
            std::mem::replace(&mut o.data, data.to_string())
        };
        if previous != data {
            self.drop_if_orphan(ObjectKind::Mesh, &previous);
        }
        Ok(())
    }

    /// Remove a mesh data block that no object uses; returns whether it was removed
    pub fn remove_orphan_mesh(&mut self, data: &str) -> bool {
        self.drop_if_orphan(ObjectKind::Mesh, data)
    }

    // ===== Selection =====

    /// Replace the selection with exactly these objects
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` for the first unknown name; the selection is
    /// unchanged in that case.
    pub fn select_only<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            self.object(name)?;
            selection.insert(name.to_string());
        }
        self.selection = selection;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.contains(name)
    }

    /// Selected object names, sorted
    pub fn selected_objects(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    /// Make an object the active one
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object does not exist.
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        self.object(name)?;
        self.active = Some(name.to_string());
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Active object name
    ///
    /// # Errors
    ///
    /// Returns `NoActiveObject` when nothing is active.
    pub fn require_active(&self) -> Result<String> {
        self.active.clone().ok_or(QgsError::NoActiveObject)
    }

    // ===== Modes =====

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch interaction mode
    ///
    /// Edit requires an active object; Pose requires an active armature.
    /// Leaving Edit clears the vertex selection.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveObject` or `WrongObjectType`.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        match mode {
            Mode::Object => {}
            Mode::Edit => {
                self.object(&self.require_active()?)?;
            }
            Mode::Pose => {
                let active = self.require_active()?;
                self.object_of_kind(&active, ObjectKind::Armature)?;
            }
        }
        if self.mode == Mode::Edit && mode != Mode::Edit {
            self.edit_selection.clear();
        }
        self.mode = mode;
        Ok(())
    }

    /// Return to Object mode; always succeeds
    pub fn force_object_mode(&mut self) {
        self.mode = Mode::Object;
        self.edit_selection.clear();
    }

    /// Fail unless the scene is in `mode`
    ///
    /// # Errors
    ///
    /// Returns `WrongMode`.
    pub fn require_mode(&self, mode: Mode) -> Result<()> {
        if self.mode != mode {
            return Err(QgsError::WrongMode {
                expected: mode,
                found: self.mode,
            });
        }
        Ok(())
    }

    /// Active mesh object, requiring Edit mode
    fn edit_mesh(&self) -> Result<String> {
        self.require_mode(Mode::Edit)?;
        let active = self.require_active()?;
        self.object_of_kind(&active, ObjectKind::Mesh)?;
        Ok(active)
    }

    pub fn edit_selection(&self) -> &BTreeSet<u32> {
        &self.edit_selection
    }

    /// Clear the vertex selection of the edited mesh
    pub fn deselect_vertices(&mut self) {
        self.edit_selection.clear();
    }

    // ===== Structural edits =====

    /// Add every vertex weighted in `group` to the edit selection
    ///
    /// Returns how many vertices were newly selected.
    ///
    /// # Errors
    ///
    /// Returns `WrongMode`, `NoActiveObject`, `WrongObjectType` or
    /// `VertexGroupNotFound`.
    pub fn select_vertices_in_group(&mut self, group: &str) -> Result<usize> {
        let active = self.edit_mesh()?;
        let mesh = self.mesh_data(&active)?;
        let vg = mesh
            .group(group)
            .ok_or_else(|| QgsError::VertexGroupNotFound {
                object: active.clone(),
                group: group.to_string(),
            })?;
        let weighted: Vec<u32> = vg.weighted_vertices().collect();
        let before = self.edit_selection.len();
        self.edit_selection.extend(weighted);
        Ok(self.edit_selection.len() - before)
    }

    /// Move the selected vertices of the edited mesh into new objects
    ///
    /// New objects copy the source transform, custom properties, modifiers,
    /// collections and every vertex group name. Faces touching a moved vertex
    /// are removed from the source. Returns the new object names.
    ///
    /// # Errors
    ///
    /// Returns `WrongMode`, `NoActiveObject`, `WrongObjectType` or
    /// `EmptySelection`.
    pub fn separate_selected(&mut self) -> Result<Vec<String>> {
        let active = self.edit_mesh()?;
        if self.edit_selection.is_empty() {
            return Err(QgsError::EmptySelection {
                what: "vertices".to_string(),
            });
        }
        let selection = std::mem::take(&mut self.edit_selection);
        let source = self.object(&active)?.clone();
        let mesh = self.mesh_data(&active)?.clone();

        let pieces = match self.split_policy {
            SplitPolicy::Single => vec![selection.clone()],
            SplitPolicy::LoosePieces => mesh.loose_parts(&selection),
        };

        let mut created = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            let data_name = unique_name(&mesh.name, |n| self.meshes.contains_key(n));
            let block = mesh.extract(data_name.clone(), piece);
            self.meshes.insert(data_name.clone(), block);

            let object_name = unique_name(&source.name, |n| self.objects.contains_key(n));
            let object = SceneObject {
                name: object_name.clone(),
                data: data_name,
                ..source.clone()
            };
            self.objects.insert(object_name.clone(), object);
            self.selection.insert(object_name.clone());
            created.push(object_name);
        }

        self.mesh_data_mut(&active)?.remove_vertices(&selection);
        tracing::debug!(object = %active, created = created.len(), "separated selection");
        Ok(created)
    }

    /// Join every other selected mesh into the active mesh
    ///
    /// Vertices are mapped into the active object's local space. The joined
    /// objects are deleted afterwards.
    ///
    /// # Errors
    ///
    /// Returns `WrongMode`, `NoActiveObject`, `WrongObjectType` or
    /// `JoinNeedsMultiple`.
    pub fn join_selected(&mut self) -> Result<()> {
        self.require_mode(Mode::Object)?;
        let active = self.require_active()?;
        let target_transform = self.object_of_kind(&active, ObjectKind::Mesh)?.transform;

        let others: Vec<String> = self
            .selection
            .iter()
            .filter(|n| **n != active)
            .filter(|n| self.objects.get(*n).is_some_and(SceneObject::is_mesh))
            .cloned()
            .collect();
        if others.is_empty() {
            return Err(QgsError::JoinNeedsMultiple);
        }

        let to_local = target_transform.matrix().inverse();
        for other in &others {
            let matrix = to_local * self.object(other)?.transform.matrix();
            let block = self.mesh_data(other)?.clone();
            self.mesh_data_mut(&active)?.append(&block, matrix);
        }
        for other in &others {
            self.delete_object(other);
        }
        self.selection.insert(active.clone());
        tracing::debug!(object = %active, joined = others.len(), "joined selection");
        Ok(())
    }

    // ===== Armature editing =====

    /// Add a bone to an armature object; returns the bone name actually used
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`, `WrongObjectType` or `DataNotFound`.
    pub fn add_bone(&mut self, armature: &str, mut bone: Bone) -> Result<String> {
        let data = self.armature_data_mut(armature)?;
        bone.name = data.unique_bone_name(&bone.name);
        let name = bone.name.clone();
        data.bones.push(bone);
        Ok(name)
    }

    /// Set or clear a bone's parent
    ///
    /// # Errors
    ///
    /// Returns `BoneNotFound` for an unknown child or parent and
    /// `CycleDetected` when the parent is the bone itself or one of its
    /// descendants.
    pub fn set_bone_parent(&mut self, armature: &str, bone: &str, parent: Option<&str>) -> Result<()> {
        let data = self.armature_data_mut(armature)?;
        let bone_not_found = |name: &str| QgsError::BoneNotFound {
            armature: armature.to_string(),
            bone: name.to_string(),
        };
        if !data.has_bone(bone) {
            return Err(bone_not_found(bone));
        }
        if let Some(parent) = parent {
            if !data.has_bone(parent) {
                return Err(bone_not_found(parent));
            }
            if data.would_create_cycle(bone, parent) {
                return Err(QgsError::CycleDetected {
                    bone: bone.to_string(),
                });
            }
        }
        if let Some(b) = data.bone_mut(bone) {
            b.parent = parent.map(str::to_string);
        }
        Ok(())
    }

    /// Select exactly these bones and make `active` the active bone
    ///
    /// # Errors
    ///
    /// Returns `BoneNotFound` for an unknown name; nothing changes then.
    pub fn select_bones(&mut self, armature: &str, bones: &[String], active: Option<&str>) -> Result<()> {
        let data = self.armature_data_mut(armature)?;
        for name in bones.iter().map(String::as_str).chain(active) {
            if !data.has_bone(name) {
                return Err(QgsError::BoneNotFound {
                    armature: armature.to_string(),
                    bone: name.to_string(),
                });
            }
        }
        for b in &mut data.bones {
            b.selected = bones.contains(&b.name);
        }
        data.active_bone = active.map(str::to_string);
        Ok(())
    }
}
