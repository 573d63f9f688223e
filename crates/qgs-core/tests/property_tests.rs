//! Property-based tests
//!
//! Invariants that hold for any partition layout:
//! - Round-trip: separate then revert restores the original geometry
//! - Idempotent detag: a second `clear_all` removes nothing
//! - Fragment merge: one result object per non-empty group

mod common;

use common::{session_with_mesh, session_with_meshes, weight_group};
use glam::Vec3;
use proptest::prelude::*;
use qgs_core::ops::tag_ops;
use qgs_core::{apply, Command, ObjectKind, SplitPolicy};

/// Disjoint quads, each assigned to one of `groups` groups or none
///
/// Quad `i` owns vertices `4i..4i+4`, so groups never share vertices.
fn assigned_mesh(assignment: &[Option<usize>], groups: usize) -> qgs_core::MeshData {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for quad in 0..assignment.len() as u32 {
        let x = 2.0 * quad as f32;
        vertices.extend([
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + 1.0, 0.0, 0.0),
            Vec3::new(x + 1.0, 1.0, 0.0),
            Vec3::new(x, 1.0, 0.0),
        ]);
        faces.push(vec![4 * quad, 4 * quad + 1, 4 * quad + 2, 4 * quad + 3]);
    }
    let mut mesh = qgs_core::MeshData::with_geometry("Body", vertices, faces);
    for g in 0..groups {
        mesh.ensure_group(&format!("QGS_Part{}", g));
    }
    for (quad, group) in assignment.iter().enumerate() {
        if let Some(g) = group {
            let base = 4 * quad as u32;
            weight_group(&mut mesh, &format!("QGS_Part{}", g), base..base + 4);
        }
    }
    mesh
}

fn layout() -> impl Strategy<Value = (usize, Vec<Option<usize>>, bool)> {
    (1usize..4).prop_flat_map(|groups| {
        (
            Just(groups),
            prop::collection::vec(prop::option::of(0..groups), 1..8),
            any::<bool>(),
        )
    })
}

proptest! {
    #[test]
    fn prop_separate_then_revert_restores_geometry((groups, assignment, loose) in layout()) {
        let mesh = assigned_mesh(&assignment, groups);
        let digest = mesh.geometry_digest();
        let (vertices, faces) = (mesh.vertex_count(), mesh.face_count());
        let mut session = session_with_mesh("Body", mesh);
        if loose {
            session.scene.split_policy = SplitPolicy::LoosePieces;
        }

        apply(&mut session, Command::Separate { object: None }).unwrap();
        apply(&mut session, Command::RevertAll).unwrap();

        let scene = &session.scene;
        prop_assert_eq!(scene.objects_of_kind(ObjectKind::Mesh), vec!["Body".to_string()]);
        let restored = scene.mesh_data("Body").unwrap();
        prop_assert_eq!(restored.vertex_count(), vertices);
        prop_assert_eq!(restored.face_count(), faces);
        prop_assert_eq!(restored.geometry_digest(), digest);
    }

    #[test]
    fn prop_one_object_per_non_empty_group((groups, assignment, loose) in layout()) {
        let mesh = assigned_mesh(&assignment, groups);
        let non_empty = (0..groups)
            .filter(|g| assignment.contains(&Some(*g)))
            .count();
        let mut session = session_with_mesh("Body", mesh);
        if loose {
            session.scene.split_policy = SplitPolicy::LoosePieces;
        }

        let outcome = qgs_core::ops::partition_ops::partition(&mut session.scene, "Body").unwrap();

        prop_assert_eq!(outcome.created.len(), non_empty);
        prop_assert_eq!(outcome.skipped_groups.len(), groups - non_empty);
    }

    #[test]
    fn prop_clear_all_is_idempotent(count in 1usize..5) {
        let names: Vec<String> = (0..count).map(|i| format!("Mesh{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut session = session_with_meshes(&refs);
        apply(&mut session, Command::CreateRig).unwrap();

        let first = tag_ops::clear_all(&mut session.scene);
        let second = tag_ops::clear_all(&mut session.scene);

        prop_assert_eq!(first.objects_deleted, 1);
        prop_assert_eq!(first.bones_removed, count);
        prop_assert!(second.is_empty());
    }
}
