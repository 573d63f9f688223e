use serde::{Deserialize, Serialize};

/// Tool settings shared by every operation in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Name of the generated armature; the reserved prefix is forced on
    pub armature_name: String,
    /// Length of generated bones along +Z
    pub bone_length: f32,
    /// Name of the object produced by a full revert; defaults to the
    /// backed-up source object
    pub output_name: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            armature_name: "QGS_Armature".to_string(),
            bone_length: 0.2,
            output_name: None,
        }
    }
}
