mod cleanup;
mod icosahedron;
mod sampling;

pub use cleanup::{CleanupMesh, MERGE_EPSILON};
pub use icosahedron::{icosahedron, subdivide, BuildBaseMesh, MAX_SUBDIVISION_LEVEL};
pub use sampling::SamplingMesh;

use crate::error::MeshError;
use crate::math::{Point3, Vector3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a counter-clockwise triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh from raw parts without validation.
    #[must_use]
    pub fn new(vertices: Vec<Point3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns the three corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal of triangle `i` from its winding, or zero if degenerate.
    #[must_use]
    pub fn face_normal(&self, i: usize) -> Vector3 {
        let [v0, v1, v2] = self.triangle(i);
        face_normal(&v0, &v1, &v2)
    }

    /// Checks that every triangle references an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfBounds`] for the first bad index.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        for (triangle, tri) in self.indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }
}

/// Unit normal of the triangle `(v0, v1, v2)`, or zero if it has no area.
#[must_use]
pub fn face_normal(v0: &Point3, v1: &Point3, v2: &Point3) -> Vector3 {
    (v1 - v0)
        .cross(&(v2 - v0))
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::zeros)
}
