use tracing::debug;

use crate::error::Result;
use crate::math::{check_range, Point3};

use super::{CleanupMesh, TriangleMesh};

/// Deepest subdivision accepted by [`BuildBaseMesh`] (163 842 vertices).
pub const MAX_SUBDIVISION_LEVEL: u32 = 7;

/// Builds the unit-sphere sampling mesh by subdividing an icosahedron.
///
/// Each round splits every triangle into four, projecting the new edge
/// midpoints onto the unit sphere, then merges the midpoints that
/// neighbouring triangles computed independently. A level-`k` mesh has
/// `10 * 4^k + 2` vertices and `20 * 4^k` triangles, all wound
/// counter-clockwise when seen from outside.
pub struct BuildBaseMesh {
    level: u32,
}

impl BuildBaseMesh {
    /// Creates a new `BuildBaseMesh` operation.
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self { level }
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the level exceeds
    /// [`MAX_SUBDIVISION_LEVEL`].
    pub fn execute(&self) -> Result<TriangleMesh> {
        check_range(
            "subdivision_level",
            f64::from(self.level),
            0.0,
            f64::from(MAX_SUBDIVISION_LEVEL),
        )?;

        let cleanup = CleanupMesh::new();
        let mut mesh = icosahedron();
        for _ in 0..self.level {
            mesh = cleanup.execute(&subdivide(&mesh));
        }

        debug!(
            level = self.level,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "built base mesh"
        );
        Ok(mesh)
    }
}

/// The regular icosahedron inscribed in the unit sphere.
#[must_use]
#[allow(clippy::manual_midpoint)] // golden ratio, not a midpoint
pub fn icosahedron() -> TriangleMesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let vertices = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Point3::from(Point3::new(x, y, z).coords.normalize()))
    .collect();

    let indices = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    TriangleMesh { vertices, indices }
}

/// Splits every triangle into four, projecting edge midpoints to the sphere.
///
/// Midpoints are appended per triangle without sharing, so an edge shared
/// by two triangles yields two coincident vertices; run [`CleanupMesh`]
/// afterwards to merge them.
#[must_use]
pub fn subdivide(mesh: &TriangleMesh) -> TriangleMesh {
    let mut vertices = mesh.vertices.clone();
    vertices.reserve(mesh.indices.len() * 3);
    let mut indices = Vec::with_capacity(mesh.indices.len() * 4);

    for &[a, b, c] in &mesh.indices {
        let ab = midpoint(a, b, &mut vertices);
        let bc = midpoint(b, c, &mut vertices);
        let ca = midpoint(c, a, &mut vertices);

        indices.push([a, ab, ca]);
        indices.push([b, bc, ab]);
        indices.push([c, ca, bc]);
        indices.push([ab, bc, ca]);
    }

    TriangleMesh { vertices, indices }
}

fn midpoint(a: u32, b: u32, vertices: &mut Vec<Point3>) -> u32 {
    let m = (vertices[a as usize].coords + vertices[b as usize].coords) * 0.5;
    vertices.push(Point3::from(m.normalize()));
    u32::try_from(vertices.len() - 1).unwrap_or(u32::MAX)
}
