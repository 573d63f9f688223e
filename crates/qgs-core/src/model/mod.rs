pub mod armature;
pub mod mesh;
pub mod metadata;
pub mod object;
pub mod transform;

pub use armature::{ArmatureData, Bone};
pub use mesh::{MeshData, VertexGroup};
pub use metadata::CustomProps;
pub use object::{Mode, Modifier, ModifierKind, ObjectKind, SceneObject};
pub use transform::Transform;
