use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Named per-vertex weight assignment, scoped to one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    pub name: String,
    /// Vertex index → weight in [0, 1]
    pub weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Assign a weight, clamped to [0, 1]
    pub fn set_weight(&mut self, vertex: u32, weight: f32) {
        self.weights.insert(vertex, weight.clamp(0.0, 1.0));
    }

    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    /// Weight present and nonzero
    pub fn is_weighted(&self, vertex: u32) -> bool {
        self.weight(vertex).is_some_and(|w| w > 0.0)
    }

    /// Vertices with a present, nonzero weight
    pub fn weighted_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.weights
            .iter()
            .filter(|(_, &w)| w > 0.0)
            .map(|(&v, _)| v)
    }

    pub fn weighted_count(&self) -> usize {
        self.weighted_vertices().count()
    }

    /// Re-index through `mapping`; vertices without a mapping are dropped
    fn remapped(&self, mapping: &BTreeMap<u32, u32>) -> Self {
        Self {
            name: self.name.clone(),
            weights: self
                .weights
                .iter()
                .filter_map(|(v, &w)| mapping.get(v).map(|&nv| (nv, w)))
                .collect(),
        }
    }
}

/// Mesh data block: geometry plus vertex groups
///
/// UVs are stored per vertex and are either empty or exactly one per vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Vec<u32>>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    #[serde(default)]
    pub vertex_groups: Vec<VertexGroup>,
}

impl MeshData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
            uvs: Vec::new(),
            vertex_groups: Vec::new(),
        }
    }

    pub fn with_geometry(name: impl Into<String>, vertices: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new(name)
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn group(&self, name: &str) -> Option<&VertexGroup> {
        self.vertex_groups.iter().find(|g| g.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        self.vertex_groups.iter_mut().find(|g| g.name == name)
    }

    /// Get or create the named group; new groups go to the end of the list
    pub fn ensure_group(&mut self, name: &str) -> &mut VertexGroup {
        let idx = match self.vertex_groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                self.vertex_groups.push(VertexGroup::new(name));
                self.vertex_groups.len() - 1
            }
        };
        &mut self.vertex_groups[idx]
    }

    /// Remove a group by name; returns whether it existed
    pub fn remove_group(&mut self, name: &str) -> bool {
        let before = self.vertex_groups.len();
        self.vertex_groups.retain(|g| g.name != name);
        before != self.vertex_groups.len()
    }

    /// Group names in insertion order
    pub fn group_names(&self) -> Vec<String> {
        self.vertex_groups.iter().map(|g| g.name.clone()).collect()
    }

    /// SHA-256 over vertices, faces and UVs (vertex groups excluded)
    ///
    /// Two meshes with the same digest are byte-identical in geometry.
    pub fn geometry_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.vertices.len() as u64).to_le_bytes());
        for v in &self.vertices {
            for c in v.to_array() {
                hasher.update(c.to_le_bytes());
            }
        }
        hasher.update((self.faces.len() as u64).to_le_bytes());
        for face in &self.faces {
            hasher.update((face.len() as u32).to_le_bytes());
            for idx in face {
                hasher.update(idx.to_le_bytes());
            }
        }
        hasher.update((self.uvs.len() as u64).to_le_bytes());
        for uv in &self.uvs {
            hasher.update(uv.x.to_le_bytes());
            hasher.update(uv.y.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Split `selection` into connected pieces
    ///
    /// Two selected vertices are connected when a face lying wholly inside the
    /// selection contains both. A selected vertex with no such face is its own
    /// piece. Pieces are ordered by their lowest vertex index.
    pub fn loose_parts(&self, selection: &BTreeSet<u32>) -> Vec<BTreeSet<u32>> {
        let mut parent: BTreeMap<u32, u32> = selection.iter().map(|&v| (v, v)).collect();

        fn find(parent: &mut BTreeMap<u32, u32>, v: u32) -> u32 {
            let mut root = v;
            while parent[&root] != root {
                root = parent[&root];
            }
            let mut cur = v;
            while parent[&cur] != root {
                let next = parent[&cur];
                parent.insert(cur, root);
                cur = next;
            }
            root
        }

        for face in &self.faces {
            if face.is_empty() || !face.iter().all(|v| selection.contains(v)) {
                continue;
            }
            for &v in &face[1..] {
                let a = find(&mut parent, face[0]);
                let b = find(&mut parent, v);
                if a != b {
                    parent.insert(a.max(b), a.min(b));
                }
            }
        }

        let mut pieces: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        for &v in selection {
            let root = find(&mut parent, v);
            pieces.entry(root).or_default().insert(v);
        }
        pieces.into_values().collect()
    }

    /// Copy the given vertices (and faces wholly inside them) into a new block
    ///
    /// All vertex group names are carried over, even if they end up empty.
    pub fn extract(&self, name: impl Into<String>, vertices: &BTreeSet<u32>) -> MeshData {
        let kept: Vec<u32> = vertices
            .iter()
            .copied()
            .filter(|&v| (v as usize) < self.vertices.len())
            .collect();
        self.rebuild(name.into(), &kept)
    }

    /// Delete the given vertices and every face touching them
    pub fn remove_vertices(&mut self, vertices: &BTreeSet<u32>) {
        let kept: Vec<u32> = (0..self.vertices.len() as u32)
            .filter(|v| !vertices.contains(v))
            .collect();
        *self = self.rebuild(self.name.clone(), &kept);
    }

    fn rebuild(&self, name: String, kept: &[u32]) -> MeshData {
        let mapping: BTreeMap<u32, u32> = kept
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u32))
            .collect();

        let faces = self
            .faces
            .iter()
            .filter(|f| f.iter().all(|v| mapping.contains_key(v)))
            .map(|f| f.iter().map(|v| mapping[v]).collect())
            .collect();

        let uvs = if self.uvs.len() == self.vertices.len() {
            kept.iter().map(|&v| self.uvs[v as usize]).collect()
        } else {
            Vec::new()
        };

        MeshData {
            name,
            vertices: kept.iter().map(|&v| self.vertices[v as usize]).collect(),
            faces,
            uvs,
            vertex_groups: self
                .vertex_groups
                .iter()
                .map(|g| g.remapped(&mapping))
                .collect(),
        }
    }

    /// Append `other`, mapping its vertices through `to_local`
    ///
    /// Vertex groups are merged by name. UVs are padded with zeros when only
    /// one side has them.
    pub fn append(&mut self, other: &MeshData, to_local: Mat4) {
        let offset = self.vertices.len() as u32;

        if !self.uvs.is_empty() || !other.uvs.is_empty() {
            self.uvs.resize(self.vertices.len(), Vec2::ZERO);
            if other.uvs.len() == other.vertices.len() {
                self.uvs.extend_from_slice(&other.uvs);
            } else {
                self.uvs
                    .resize(self.vertices.len() + other.vertices.len(), Vec2::ZERO);
            }
        }

        self.vertices.extend(
            other
                .vertices
                .iter()
                .map(|&p| to_local.transform_point3(p)),
        );
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|v| v + offset).collect::<Vec<_>>()),
        );

        for group in &other.vertex_groups {
            let target = self.ensure_group(&group.name);
            for (&v, &w) in &group.weights {
                target.weights.insert(v + offset, w);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two separate quads: vertices 0..4 and 4..8
    fn two_quads() -> MeshData {
        let mut vertices = Vec::new();
        for x in [0.0, 10.0] {
            vertices.push(Vec3::new(x, 0.0, 0.0));
            vertices.push(Vec3::new(x + 1.0, 0.0, 0.0));
            vertices.push(Vec3::new(x + 1.0, 1.0, 0.0));
            vertices.push(Vec3::new(x, 1.0, 0.0));
        }
        let mut mesh =
            MeshData::with_geometry("Quads", vertices, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
        let group = mesh.ensure_group("QGS_Left");
        for v in 0..4 {
            group.set_weight(v, 1.0);
        }
        mesh
    }

    #[test]
    fn test_set_weight_clamps() {
        let mut g = VertexGroup::new("g");
        g.set_weight(0, 1.5);
        g.set_weight(1, -0.5);
        assert_eq!(g.weight(0), Some(1.0));
        assert_eq!(g.weight(1), Some(0.0));
        assert!(!g.is_weighted(1));
        assert_eq!(g.weighted_count(), 1);
    }

    #[test]
    fn test_ensure_group_is_idempotent() {
        let mut mesh = MeshData::new("m");
        mesh.ensure_group("a");
        mesh.ensure_group("b");
        mesh.ensure_group("a");
        assert_eq!(mesh.group_names(), vec!["a", "b"]);
        assert!(mesh.remove_group("a"));
        assert!(!mesh.remove_group("a"));
    }

    #[test]
    fn test_loose_parts_splits_islands() {
        let mesh = two_quads();
        let all: BTreeSet<u32> = (0..8).collect();
        let parts = mesh.loose_parts(&all);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], (0..4).collect());
        assert_eq!(parts[1], (4..8).collect());
    }

    #[test]
    fn test_loose_parts_isolated_vertices() {
        let mesh = two_quads();
        // Face 0 is not wholly selected, so 0 and 1 stay apart
        let sel: BTreeSet<u32> = [0, 1].into_iter().collect();
        assert_eq!(mesh.loose_parts(&sel).len(), 2);
    }

    #[test]
    fn test_extract_and_remove_partition_vertices() {
        let mut mesh = two_quads();
        let left: BTreeSet<u32> = (0..4).collect();

        let piece = mesh.extract("Piece", &left);
        assert_eq!(piece.vertex_count(), 4);
        assert_eq!(piece.faces, vec![vec![0, 1, 2, 3]]);
        assert_eq!(piece.group("QGS_Left").unwrap().weighted_count(), 4);

        mesh.remove_vertices(&left);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2, 3]]);
        assert_eq!(mesh.vertices[0], Vec3::new(10.0, 0.0, 0.0));
        // Group name survives with no weights
        assert_eq!(mesh.group("QGS_Left").unwrap().weighted_count(), 0);
    }

    #[test]
    fn test_append_offsets_faces_and_merges_groups() {
        let mut a = MeshData::with_geometry("A", vec![Vec3::ZERO], vec![]);
        a.ensure_group("shared").set_weight(0, 1.0);
        let mut b = MeshData::with_geometry("B", vec![Vec3::X, Vec3::Y, Vec3::Z], vec![vec![0, 1, 2]]);
        b.uvs = vec![Vec2::ONE; 3];
        b.ensure_group("shared").set_weight(2, 0.5);

        a.append(&b, Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)));

        assert_eq!(a.vertex_count(), 4);
        assert_eq!(a.faces, vec![vec![1, 2, 3]]);
        assert_eq!(a.vertices[1], Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(a.uvs, vec![Vec2::ZERO, Vec2::ONE, Vec2::ONE, Vec2::ONE]);
        let shared = a.group("shared").unwrap();
        assert_eq!(shared.weight(0), Some(1.0));
        assert_eq!(shared.weight(3), Some(0.5));
    }

    #[test]
    fn test_geometry_digest_ignores_groups_but_not_vertices() {
        let mesh = two_quads();
        let mut regrouped = mesh.clone();
        regrouped.vertex_groups.clear();
        assert_eq!(mesh.geometry_digest(), regrouped.geometry_digest());

        let mut moved = mesh.clone();
        moved.vertices[0].x += 0.5;
        assert_ne!(mesh.geometry_digest(), moved.geometry_digest());
    }

    #[test]
    fn test_vertex_group_json_roundtrip() {
        let mesh = two_quads();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: MeshData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}
