use crate::math::Point3;
use crate::mesh::TriangleMesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Edge lengths along x, y and z.
    #[must_use]
    pub fn extents(&self) -> [f64; 3] {
        let d = self.max - self.min;
        [d.x, d.y, d.z]
    }
}

/// One particle's boundary: the sampling mesh's triangles with evaluated
/// vertex positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSurface {
    mesh: TriangleMesh,
}

impl ParticleSurface {
    /// Wraps an evaluated mesh.
    #[must_use]
    pub fn new(mesh: TriangleMesh) -> Self {
        Self { mesh }
    }

    /// The underlying triangle mesh.
    #[must_use]
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Consumes the surface, returning its mesh.
    #[must_use]
    pub fn into_mesh(self) -> TriangleMesh {
        self.mesh
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.mesh.vertices
    }

    /// Returns a copy with every coordinate multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let vertices = self
            .mesh
            .vertices
            .iter()
            .map(|v| Point3::from(v.coords * factor))
            .collect();
        Self::new(TriangleMesh::new(vertices, self.mesh.indices.clone()))
    }

    /// Smallest and largest vertex distance from the origin.
    ///
    /// Returns `None` for a surface without vertices.
    #[must_use]
    pub fn radius_range(&self) -> Option<(f64, f64)> {
        self.mesh
            .vertices
            .iter()
            .map(|v| v.coords.norm())
            .fold(None, |acc, r| match acc {
                None => Some((r, r)),
                Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
            })
    }

    /// Axis-aligned bounds of the vertices, `None` when empty.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.mesh.vertices.first()?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for v in &self.mesh.vertices[1..] {
            aabb.min = aabb.min.inf(v);
            aabb.max = aabb.max.sup(v);
        }
        Some(aabb)
    }
}
