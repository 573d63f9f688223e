//! QGS Core - reversible rigging and partitioning over an in-memory scene
//!
//! This crate provides the host scene model and every tool operation on it:
//! - Scene graph of mesh and armature objects with selection, modes and
//!   structural edits (separate, join)
//! - Tag Registry marking tool-owned objects and sub-resources
//! - Backup Store capturing mesh geometry before partitioning
//! - Partition Engine splitting meshes by vertex group, and rejoin
//! - Bone Parent History with single-slot undo
//! - Rig creation and the Revert Orchestrator undoing all tool activity
//! - Scene validation and read-only change counts
//!
//! Front ends go through `apply()` with a `Session`.

pub mod apply;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod queries;
pub mod report;
pub mod rules;
pub mod session;

/// Paths used by the exported logging macros
#[doc(hidden)]
pub mod __private {
    pub use qgs_core_types::schema;
    pub use tracing;
}

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use config::ToolConfig;
pub use errors::{ExError, ExErrorKind, QgsError, Result};
pub use model::{ArmatureData, Bone, MeshData, Mode, ObjectKind, SceneObject, Transform, VertexGroup};
pub use ops::{Scene, SplitPolicy};
pub use queries::{count_qgs_changes, ChangeCounts};
pub use report::{OperatorReport, ReportStatus, Severity};
pub use session::Session;
