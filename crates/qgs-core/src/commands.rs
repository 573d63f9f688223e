//! Command types for every user-facing operation
//!
//! Commands are the entry point into the tool via the `apply()` function.

/// Operation requested by a front end
///
/// Optional object names default to the active object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a tagged armature over the selected meshes
    CreateRig,

    /// Back up a mesh and split it by vertex group
    Separate { object: Option<String> },

    /// Parent selected bones to the active bone
    Reparent { armature: Option<String> },

    /// Clear the parent of selected bones
    Unparent { armature: Option<String> },

    /// Undo the last reparent/unparent of selected bones
    ReverseParent { armature: Option<String> },

    /// Undo every tool-made change
    RevertAll,
}

impl Command {
    /// Stable operation name used in logs and error context
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::CreateRig => "create_rig",
            Command::Separate { .. } => "separate",
            Command::Reparent { .. } => "reparent",
            Command::Unparent { .. } => "unparent",
            Command::ReverseParent { .. } => "reverse_parent",
            Command::RevertAll => "revert_all",
        }
    }
}
