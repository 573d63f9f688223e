/// Scenario 4: Fragment merge
///
/// A group whose vertices form several disconnected pieces still yields
/// exactly one object, whatever the host's split behavior.
mod common;

use common::{quad_strip, session_with_mesh, weight_group};
use qgs_core::ops::partition_ops;
use qgs_core::{apply, Command, ObjectKind, SplitPolicy};

/// Quads 0 and 3 of a 4-quad strip in one group; vertices 4 and 5 unassigned
fn split_group_mesh() -> qgs_core::MeshData {
    let mut mesh = quad_strip("Body", 4);
    weight_group(&mut mesh, "Ends", [0, 1, 2, 3]);
    weight_group(&mut mesh, "Ends", [6, 7, 8, 9]);
    mesh
}

#[test]
fn test_scenario_04_loose_pieces_are_merged() {
    for policy in [SplitPolicy::Single, SplitPolicy::LoosePieces] {
        // GIVEN a group spanning two separate quads
        let mut session = session_with_mesh("Body", split_group_mesh());
        session.scene.split_policy = policy;

        // WHEN partitioning
        let outcome = partition_ops::partition(&mut session.scene, "Body").expect("Should partition");

        // THEN exactly one result object exists for the group
        assert_eq!(outcome.created, vec!["Ends"], "policy {:?}", policy);
        let ends = session.scene.mesh_data("Ends").unwrap();
        assert_eq!(ends.vertex_count(), 8);
        assert_eq!(ends.face_count(), 2);
        let expected_merges = usize::from(policy == SplitPolicy::LoosePieces);
        assert_eq!(outcome.merged_fragments, expected_merges);
    }
}

#[test]
fn test_scenario_04_merged_fragments_revert_cleanly() {
    // GIVEN a loose-pieces host and a group touching both ends of the strip
    let mut session = session_with_mesh("Body", split_group_mesh());
    session.scene.split_policy = SplitPolicy::LoosePieces;
    let original = session.scene.mesh_data("Body").unwrap().geometry_digest();

    // WHEN separating and then reverting
    apply(&mut session, Command::Separate { object: None }).expect("Should separate");
    apply(&mut session, Command::RevertAll).expect("Should revert");

    // THEN the original geometry is back under the original name
    let scene = &session.scene;
    assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Body"]);
    assert_eq!(scene.mesh_data("Body").unwrap().geometry_digest(), original);
}
