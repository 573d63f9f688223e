pub mod backup_ops;
pub mod bone_ops;
pub mod partition_ops;
pub mod revert_ops;
pub mod rig_ops;
pub mod scene;
pub mod tag_ops;

pub use scene::{Scene, SplitPolicy};
