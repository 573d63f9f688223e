//! Backup Store
//!
//! One-slot snapshot of a mesh's geometry taken before partitioning. The
//! snapshot is an orphaned copy of the mesh data block; the record pointing at
//! it lives in the scene custom property [`BACKUP_SLOT_KEY`] so it survives
//! with the scene file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scene::Scene;
use crate::errors::{QgsError, Result};

/// Scene custom property holding the live backup record
pub const BACKUP_SLOT_KEY: &str = "QGS_backup";

/// Identifier of a backup; also the name of its orphaned mesh data block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupId(String);

impl BackupId {
    fn generate() -> Self {
        Self(format!("QGS_backup.{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BackupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for BackupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of a captured mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: BackupId,
    pub source_object: String,
    pub source_data: String,
    pub geometry_digest: String,
    pub vertex_count: usize,
    pub face_count: usize,
    pub captured_at: DateTime<Utc>,
    /// Objects partitioned out of the source, by their current names
    #[serde(default)]
    pub pieces: Vec<String>,
}

/// The live backup record, if any
///
/// # Errors
///
/// Returns `Serialization` when the slot holds something that is not a
/// backup record.
pub fn current(scene: &Scene) -> Result<Option<BackupRecord>> {
    match scene.props.get(BACKUP_SLOT_KEY) {
        None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

/// Snapshot the mesh data of `object` into an orphaned block
///
/// # Errors
///
/// Returns `BackupAlreadyExists` while a record is live, or the lookup
/// errors of `Scene::mesh_data`.
pub fn capture(scene: &mut Scene, object: &str) -> Result<BackupId> {
    if let Some(existing) = current(scene)? {
        return Err(QgsError::BackupAlreadyExists {
            id: existing.id.to_string(),
        });
    }

    let mesh = scene.mesh_data(object)?;
    let source_data = mesh.name.clone();
    let geometry_digest = mesh.geometry_digest();
    let vertex_count = mesh.vertex_count();
    let face_count = mesh.face_count();

    let wanted = BackupId::generate();
    let id = BackupId(scene.duplicate_mesh_data(&source_data, wanted.as_str())?);

    let record = BackupRecord {
        id: id.clone(),
        source_object: object.to_string(),
        source_data,
        geometry_digest,
        vertex_count,
        face_count,
        captured_at: Utc::now(),
        pieces: Vec::new(),
    };
    scene
        .props
        .set(BACKUP_SLOT_KEY, serde_json::to_value(&record)?);

    tracing::debug!(object, backup_id = %id, vertex_count, "captured backup");
    Ok(id)
}

/// Replace the piece list of the live record `id`
///
/// Revert joins only these objects (plus the source) back into the restored
/// mesh.
///
/// # Errors
///
/// Returns `BackupNotFound` if `id` is not the live record.
pub fn set_pieces(scene: &mut Scene, id: &BackupId, pieces: Vec<String>) -> Result<()> {
    let mut record = current(scene)?
        .filter(|r| r.id == *id)
        .ok_or_else(|| QgsError::BackupNotFound { id: id.to_string() })?;
    record.pieces = pieces;
    scene
        .props
        .set(BACKUP_SLOT_KEY, serde_json::to_value(&record)?);
    Ok(())
}

/// Put the captured geometry back on `target` and consume the record
///
/// `target` is re-pointed at the backup block, then object and data are
/// renamed to `name`. The block replaced on `target` is dropped once it has
/// no users. Returns the object name actually assigned.
///
/// # Errors
///
/// Returns `BackupNotFound` if `id` is not the live record or its block is
/// gone, `InvariantViolation` if the block no longer matches the recorded
/// digest, or the lookup errors of the scene.
pub fn restore(scene: &mut Scene, id: &BackupId, target: &str, name: &str) -> Result<String> {
    let record = current(scene)?
        .filter(|r| r.id == *id)
        .ok_or_else(|| QgsError::BackupNotFound { id: id.to_string() })?;
    let block = scene
        .mesh_block(id.as_str())
        .ok_or_else(|| QgsError::BackupNotFound { id: id.to_string() })?;
    if block.geometry_digest() != record.geometry_digest {
        return Err(QgsError::InvariantViolation {
            reason: format!("backup {} does not match its recorded digest", id),
        });
    }

    scene.set_object_data(target, id.as_str())?;
    let assigned = scene.rename_object(target, name)?;
    scene.rename_data(&assigned, name)?;
    scene.props.remove(BACKUP_SLOT_KEY);

    tracing::debug!(object = %assigned, backup_id = %id, "restored backup");
    Ok(assigned)
}

/// Discard a live record and its orphaned block without restoring
///
/// Returns whether a matching record was found.
pub fn consume(scene: &mut Scene, id: &BackupId) -> bool {
    let matches = current(scene)
        .ok()
        .flatten()
        .is_some_and(|r| r.id == *id);
    if matches {
        scene.props.remove(BACKUP_SLOT_KEY);
        scene.remove_orphan_mesh(id.as_str());
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeshData, ObjectKind};
    use glam::Vec3;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_mesh_object(
            "Body",
            MeshData::with_geometry("Body", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![vec![0, 1, 2]]),
        );
        scene
    }

    #[test]
    fn test_capture_creates_orphan_and_record() {
        let mut scene = scene();
        let id = capture(&mut scene, "Body").unwrap();

        let record = current(&scene).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.source_object, "Body");
        assert_eq!(record.vertex_count, 3);
        assert_eq!(scene.data_users(ObjectKind::Mesh, id.as_str()), 0);
    }

    #[test]
    fn test_second_capture_rejected() {
        let mut scene = scene();
        capture(&mut scene, "Body").unwrap();
        assert!(matches!(
            capture(&mut scene, "Body"),
            Err(QgsError::BackupAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_restore_is_consume_once() {
        let mut scene = scene();
        let id = capture(&mut scene, "Body").unwrap();
        scene.mesh_data_mut("Body").unwrap().vertices.clear();

        let name = restore(&mut scene, &id, "Body", "Restored").unwrap();

        assert_eq!(name, "Restored");
        assert_eq!(scene.mesh_data("Restored").unwrap().vertex_count(), 3);
        assert_eq!(scene.object("Restored").unwrap().data, "Restored");
        assert!(current(&scene).unwrap().is_none());
        assert!(matches!(
            restore(&mut scene, &id, "Restored", "Again"),
            Err(QgsError::BackupNotFound { .. })
        ));
    }

    #[test]
    fn test_set_pieces_only_on_live_record() {
        let mut scene = scene();
        let id = capture(&mut scene, "Body").unwrap();

        set_pieces(&mut scene, &id, vec!["Left".to_string()]).unwrap();

        assert_eq!(current(&scene).unwrap().unwrap().pieces, vec!["Left"]);
        assert!(matches!(
            set_pieces(&mut scene, &BackupId::from("QGS_backup.other"), Vec::new()),
            Err(QgsError::BackupNotFound { .. })
        ));
    }

    #[test]
    fn test_consume_drops_block() {
        let mut scene = scene();
        let id = capture(&mut scene, "Body").unwrap();

        assert!(consume(&mut scene, &id));
        assert!(scene.mesh_block(id.as_str()).is_none());
        assert!(!consume(&mut scene, &id));
    }
}
