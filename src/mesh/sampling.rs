use crate::error::{MeshError, Result};
use crate::math::{to_spherical, SphericalCoord};

use super::{BuildBaseMesh, TriangleMesh};

/// A unit-sphere mesh paired with the angular coordinates of its vertices.
///
/// Built once and shared read-only by every particle that samples it.
/// Evaluation never writes into it; each particle gets its own vertex
/// array instead.
#[derive(Debug, Clone)]
pub struct SamplingMesh {
    mesh: TriangleMesh,
    angles: Vec<SphericalCoord>,
}

impl SamplingMesh {
    /// Builds a subdivided icosahedron of the given level and maps its
    /// vertices to angular coordinates.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the level is too deep.
    pub fn new(level: u32) -> Result<Self> {
        let mesh = BuildBaseMesh::new(level).execute()?;
        Self::from_mesh(mesh)
    }

    /// Wraps an existing sphere-like mesh.
    ///
    /// # Errors
    ///
    /// Returns a mesh error if a triangle references a missing vertex.
    pub fn from_mesh(mesh: TriangleMesh) -> Result<Self> {
        mesh.validate()?;
        let angles = to_spherical(&mesh.vertices);
        Ok(Self { mesh, angles })
    }

    /// Pairs a mesh with precomputed angular coordinates.
    ///
    /// # Errors
    ///
    /// Returns a mesh error if the counts differ or the mesh is invalid.
    pub fn with_angles(mesh: TriangleMesh, angles: Vec<SphericalCoord>) -> Result<Self> {
        mesh.validate()?;
        if angles.len() != mesh.vertex_count() {
            return Err(MeshError::CoordinateCountMismatch {
                angles: angles.len(),
                vertices: mesh.vertex_count(),
            }
            .into());
        }
        Ok(Self { mesh, angles })
    }

    /// The underlying unit-sphere mesh.
    #[must_use]
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Angular coordinates, one per vertex.
    #[must_use]
    pub fn angles(&self) -> &[SphericalCoord] {
        &self.angles
    }

    /// Triangle indices shared by every surface evaluated on this mesh.
    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.mesh.indices
    }

    /// Number of sample points.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
}
