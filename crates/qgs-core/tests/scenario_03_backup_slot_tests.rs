/// Scenario 3: Backup slot lifecycle
///
/// A second capture while a record is live is rejected instead of orphaning
/// the first snapshot.
mod common;

use common::{quad_strip, session_with_mesh, weight_group};
use qgs_core::errors::{ExError, ExErrorKind, QgsError};
use qgs_core::ops::backup_ops;
use qgs_core::{apply, Command, ObjectKind, ReportStatus};

#[test]
fn test_scenario_03_second_capture_is_rejected() {
    // GIVEN a captured backup
    let mut session = session_with_mesh("Body", quad_strip("Body", 2));
    let first = backup_ops::capture(&mut session.scene, "Body").expect("Should capture");

    // WHEN capturing again without consuming
    let err = backup_ops::capture(&mut session.scene, "Body").unwrap_err();

    // THEN the call is rejected and the first record is still live
    assert_eq!(
        err,
        QgsError::BackupAlreadyExists {
            id: first.to_string()
        }
    );
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::AlreadyExists);
    let record = backup_ops::current(&session.scene).unwrap().unwrap();
    assert_eq!(record.id, first);
}

#[test]
fn test_scenario_03_second_separate_is_cancelled() {
    // GIVEN a separated mesh with a pending backup
    let mut mesh = quad_strip("Body", 3);
    weight_group(&mut mesh, "Left", 0..4);
    let mut session = session_with_mesh("Body", mesh);
    apply(&mut session, Command::Separate { object: None }).expect("Should separate");
    let objects_before = session.scene.object_names();

    // WHEN separating the residual again
    let err = apply(
        &mut session,
        Command::Separate {
            object: Some("Body".to_string()),
        },
    )
    .unwrap_err();

    // THEN it is a precondition failure with an unchanged scene
    assert!(err.is_precondition());
    let report = qgs_core::OperatorReport::from_error(&err);
    assert_eq!(report.status, ReportStatus::Cancelled);
    assert_eq!(session.scene.object_names(), objects_before);
}

#[test]
fn test_scenario_03_backup_block_is_orphan() {
    // GIVEN a captured backup
    let mut session = session_with_mesh("Body", quad_strip("Body", 1));
    let id = backup_ops::capture(&mut session.scene, "Body").expect("Should capture");

    // THEN the snapshot block has no users and the record matches the source
    assert_eq!(session.scene.data_users(ObjectKind::Mesh, id.as_str()), 0);
    let record = backup_ops::current(&session.scene).unwrap().unwrap();
    let digest = session.scene.mesh_data("Body").unwrap().geometry_digest();
    assert_eq!(record.geometry_digest, digest);
    assert_eq!(record.face_count, 1);

    // WHEN consuming it
    assert!(backup_ops::consume(&mut session.scene, &id));

    // THEN block and record are gone
    assert!(session.scene.mesh_block(id.as_str()).is_none());
    assert!(backup_ops::current(&session.scene).unwrap().is_none());
}
