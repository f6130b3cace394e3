use tracing::debug;

use crate::error::{EvaluationError, Result};
use crate::math::legendre::LegendreTable;
use crate::math::{Complex, Point3, SphericalCoord};
use crate::mesh::{SamplingMesh, TriangleMesh};
use crate::surface::ParticleSurface;

use super::{Axis, CoefficientTensor};

/// Evaluates a coefficient tensor at angular positions.
///
/// Each Cartesian component is the real part of its own complex series
/// `Σ_n Σ_m c[n, m] Y_n^m(θ, φ)`; the three results form the new vertex.
/// Cost is `O(vertices * (L+1)^2)`.
pub struct EvaluateSurface<'a> {
    coefficients: &'a CoefficientTensor,
}

impl<'a> EvaluateSurface<'a> {
    /// Creates a new `EvaluateSurface` operation.
    #[must_use]
    pub fn new(coefficients: &'a CoefficientTensor) -> Self {
        Self { coefficients }
    }

    /// Evaluates one position per angular coordinate, in order.
    #[must_use]
    pub fn positions(&self, angles: &[SphericalCoord]) -> Vec<Point3> {
        let mut table = LegendreTable::new(self.coefficients.degree_cutoff());
        angles
            .iter()
            .map(|coord| evaluate_point(self.coefficients, coord, &mut table))
            .collect()
    }

    /// Evaluates the tensor on every vertex of `sampling`, producing a
    /// surface with the sampling mesh's triangles.
    ///
    /// The sampling mesh itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::VertexCountMismatch`] if the mesh and
    /// its angular coordinates disagree in length.
    pub fn execute(&self, sampling: &SamplingMesh) -> Result<ParticleSurface> {
        let vertices = self.positions(sampling.angles());
        if vertices.len() != sampling.vertex_count() {
            return Err(EvaluationError::VertexCountMismatch {
                positions: vertices.len(),
                vertices: sampling.vertex_count(),
            }
            .into());
        }

        debug!(
            vertices = vertices.len(),
            degree_cutoff = self.coefficients.degree_cutoff(),
            "evaluated surface"
        );
        Ok(ParticleSurface::new(TriangleMesh::new(
            vertices,
            sampling.indices().to_vec(),
        )))
    }
}

/// Evaluates the three series at a single direction.
///
/// `table` is scratch space reused between calls; it is resized if its
/// degree does not match the tensor.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn evaluate_point(
    coefficients: &CoefficientTensor,
    coord: &SphericalCoord,
    table: &mut LegendreTable,
) -> Point3 {
    let lmax = coefficients.degree_cutoff();
    if table.degree() != lmax {
        *table = LegendreTable::new(lmax);
    }
    table.fill(coord.theta);

    let mut sum = [Complex::new(0.0, 0.0); 3];

    for m in 0..=lmax {
        let phase = Complex::from_polar(1.0, m as f64 * coord.phi);
        let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
        let mi = m as i32;

        for n in m..=lmax {
            let y_pos = phase * table.get(n, m);
            if m == 0 {
                for axis in Axis::ALL {
                    sum[axis.index()] += coefficients.get(n, 0, axis) * y_pos;
                }
            } else {
                // Y_n^{-m} = (-1)^m conj(Y_n^m)
                let y_neg = y_pos.conj() * sign;
                for axis in Axis::ALL {
                    sum[axis.index()] += coefficients.get(n, mi, axis) * y_pos
                        + coefficients.get(n, -mi, axis) * y_neg;
                }
            }
        }
    }

    Point3::new(sum[0].re, sum[1].re, sum[2].re)
}
