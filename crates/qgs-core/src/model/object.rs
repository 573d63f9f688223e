use serde::{Deserialize, Serialize};

use super::metadata::CustomProps;
use super::transform::Transform;

/// Object type; decides which data block table `SceneObject::data` points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Armature,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Mesh => write!(f, "mesh"),
            ObjectKind::Armature => write!(f, "armature"),
        }
    }
}

/// Interaction mode of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Object,
    Edit,
    Pose,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Object => write!(f, "OBJECT"),
            Mode::Edit => write!(f, "EDIT"),
            Mode::Pose => write!(f, "POSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModifierKind {
    /// Deforms the mesh by the target armature's bones
    Armature { target: Option<String> },
}

/// Named modifier on an object's stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    pub kind: ModifierKind,
}

impl Modifier {
    pub fn armature(name: impl Into<String>, target: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModifierKind::Armature { target },
        }
    }

    /// Armature this modifier deforms with, if any
    pub fn armature_target(&self) -> Option<&str> {
        match &self.kind {
            ModifierKind::Armature { target } => target.as_deref(),
        }
    }
}

/// Scene graph node
///
/// Objects are addressed by name; the name is unique within a scene. `data`
/// names the mesh or armature data block, depending on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub data: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub props: CustomProps,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Collections this object is linked into
    #[serde(default)]
    pub collections: Vec<String>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            data: data.into(),
            transform: Transform::default(),
            props: CustomProps::new(),
            modifiers: Vec::new(),
            collections: Vec::new(),
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }

    pub fn is_armature(&self) -> bool {
        self.kind == ObjectKind::Armature
    }

    pub fn modifier(&self, name: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    /// Remove a modifier by name; returns whether it existed
    pub fn remove_modifier(&mut self, name: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.name != name);
        before != self.modifiers.len()
    }
}
