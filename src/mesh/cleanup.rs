use std::collections::HashMap;

use crate::math::Point3;

use super::TriangleMesh;

/// Distance below which two vertices are treated as the same point.
pub const MERGE_EPSILON: f64 = 1e-9;

/// Merges coincident vertices and remaps triangle indices.
///
/// Vertices are bucketed on a grid whose cell size equals the merge
/// distance, so each lookup only inspects the 27 neighbouring cells. The
/// first occurrence of a point wins; surviving vertices keep their relative
/// order. Triangles that collapse (two corners merged) are dropped.
pub struct CleanupMesh {
    epsilon: f64,
}

impl Default for CleanupMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupMesh {
    /// Creates a cleanup pass using [`MERGE_EPSILON`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            epsilon: MERGE_EPSILON,
        }
    }

    /// Overrides the merge distance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Executes the pass, returning the deduplicated mesh.
    #[must_use]
    pub fn execute(&self, mesh: &TriangleMesh) -> TriangleMesh {
        let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
        let mut vertices: Vec<Point3> = Vec::with_capacity(mesh.vertices.len());
        let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertices.len());

        for v in &mesh.vertices {
            let cell = self.cell(v);
            let existing = neighbours(cell).find_map(|key| {
                grid.get(&key)?
                    .iter()
                    .copied()
                    .find(|&j| (vertices[j as usize] - v).norm() < self.epsilon)
            });

            let index = if let Some(j) = existing {
                j
            } else {
                let j = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
                vertices.push(*v);
                grid.entry(cell).or_default().push(j);
                j
            };
            remap.push(index);
        }

        let indices = mesh
            .indices
            .iter()
            .map(|tri| tri.map(|i| remap[i as usize]))
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .collect();

        TriangleMesh { vertices, indices }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, p: &Point3) -> [i64; 3] {
        [
            (p.x / self.epsilon).floor() as i64,
            (p.y / self.epsilon).floor() as i64,
            (p.z / self.epsilon).floor() as i64,
        ]
    }
}

fn neighbours(cell: [i64; 3]) -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dz| {
                [
                    cell[0].saturating_add(dx),
                    cell[1].saturating_add(dy),
                    cell[2].saturating_add(dz),
                ]
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn merges_exact_duplicates() {
        let mesh = TriangleMesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        let clean = CleanupMesh::new().execute(&mesh);
        assert_eq!(clean.vertex_count(), 4);
        assert_eq!(clean.indices, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn merges_across_cell_boundaries() {
        // Straddles a grid line but is closer than epsilon.
        let a = p(-1e-10, 0.0, 0.0);
        let b = p(1e-10, 0.0, 0.0);
        let mesh = TriangleMesh::new(vec![a, b], vec![]);
        assert_eq!(CleanupMesh::new().execute(&mesh).vertex_count(), 1);
    }

    #[test]
    fn keeps_distinct_points() {
        let mesh = TriangleMesh::new(vec![p(0.0, 0.0, 0.0), p(1e-6, 0.0, 0.0)], vec![]);
        assert_eq!(CleanupMesh::new().execute(&mesh).vertex_count(), 2);
    }

    #[test]
    fn drops_collapsed_triangles() {
        let mesh = TriangleMesh::new(
            vec![p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let clean = CleanupMesh::new().execute(&mesh);
        assert_eq!(clean.triangle_count(), 0);
    }

    #[test]
    fn custom_epsilon_merges_near_points() {
        let mesh = TriangleMesh::new(vec![p(0.0, 0.0, 0.0), p(1e-4, 0.0, 0.0)], vec![]);
        let clean = CleanupMesh::new().with_epsilon(1e-3).execute(&mesh);
        assert_eq!(clean.vertex_count(), 1);
    }
}
