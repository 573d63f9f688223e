use glam::Vec3;
use qgs_core::{MeshData, Scene, Session};

/// Strip of `quads` unit quads along +X: 2 * (quads + 1) vertices
///
/// Quad `i` uses vertices `2i, 2i+2, 2i+3, 2i+1`.
#[allow(dead_code)]
pub fn quad_strip(name: &str, quads: u32) -> MeshData {
    let mut vertices = Vec::new();
    for i in 0..=quads {
        vertices.push(Vec3::new(i as f32, 0.0, 0.0));
        vertices.push(Vec3::new(i as f32, 1.0, 0.0));
    }
    let faces = (0..quads)
        .map(|i| vec![2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1])
        .collect();
    MeshData::with_geometry(name, vertices, faces)
}

/// Weight `vertices` fully in `group`, creating the group if needed
#[allow(dead_code)]
pub fn weight_group(mesh: &mut MeshData, group: &str, vertices: impl IntoIterator<Item = u32>) {
    let vg = mesh.ensure_group(group);
    for v in vertices {
        vg.set_weight(v, 1.0);
    }
}

/// Session holding a single mesh object, active and selected
#[allow(dead_code)]
pub fn session_with_mesh(name: &str, mesh: MeshData) -> Session {
    let mut scene = Scene::new();
    let name = scene.add_mesh_object(name, mesh);
    scene.select_only([&name]).unwrap();
    scene.set_active(&name).unwrap();
    Session::new(scene)
}

/// Session with one small mesh per name, all selected, spread along +X
#[allow(dead_code)]
pub fn session_with_meshes(names: &[&str]) -> Session {
    let mut scene = Scene::new();
    for (i, name) in names.iter().enumerate() {
        scene.add_mesh_object(name, quad_strip(name, 1));
        scene.object_mut(name).unwrap().transform.location = Vec3::new(2.0 * i as f32, 0.0, 0.0);
    }
    scene.select_only(names.iter().copied()).unwrap();
    if let Some(first) = names.first() {
        scene.set_active(first).unwrap();
    }
    Session::new(scene)
}
