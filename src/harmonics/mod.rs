//! Spherical-harmonic particle representation.
//!
//! A particle boundary is the map `(θ, φ) -> (x, y, z)` where each
//! Cartesian component is an independent truncated complex series
//! `Re Σ_n Σ_m c[n, m] Y_n^m(θ, φ)`. Degree 0 places the centroid,
//! degree 1 carries the ellipsoidal form, degrees 2-8 the angularity and
//! degrees 9 and up the surface roughness.

mod descriptors;
mod evaluate;
mod synthesize;

pub use descriptors::{
    band_normalizer, DescriptorsBuilder, MorphologyDescriptors, ANGULARITY_BAND,
    ANGULARITY_EXPONENT, DEFAULT_DEGREE_CUTOFF, MAX_DEGREE_CUTOFF, MIN_DEGREE_CUTOFF,
    ROUGHNESS_BAND, ROUGHNESS_EXPONENT,
};
pub use evaluate::{evaluate_point, EvaluateSurface};
pub use synthesize::SynthesizeCoefficients;

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use nalgebra::DMatrix;

use crate::error::SynthesisError;
use crate::math::Complex;

/// Cartesian component described by one column of a [`CoefficientTensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in column order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Column index of this axis.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// L2 norm of the degree-1 coefficients of the unit sphere, `sqrt(4π)`.
///
/// Per-degree amplitudes are reported relative to this value, so a degree
/// with amplitude 0.1 carries a tenth of the unit sphere's form energy.
#[must_use]
pub fn unit_sphere_amplitude() -> f64 {
    (4.0 * PI).sqrt()
}

/// Complex SH coefficients for the three Cartesian components.
///
/// Packed as `(L+1)^2` rows by 3 columns; degree `n`, order `m` lives in
/// row `n^2 + n + m`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTensor {
    degree_cutoff: usize,
    data: DMatrix<Complex>,
}

impl CoefficientTensor {
    /// All-zero tensor for degrees `0..=degree_cutoff`.
    #[must_use]
    pub fn zeros(degree_cutoff: usize) -> Self {
        let rows = (degree_cutoff + 1) * (degree_cutoff + 1);
        Self {
            degree_cutoff,
            data: DMatrix::from_element(rows, 3, Complex::new(0.0, 0.0)),
        }
    }

    /// Wraps a packed coefficient matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::ShapeMismatch`] unless the matrix has
    /// `(degree_cutoff + 1)^2` rows and 3 columns.
    pub fn from_matrix(
        degree_cutoff: usize,
        data: DMatrix<Complex>,
    ) -> Result<Self, SynthesisError> {
        let expected = (degree_cutoff + 1) * (degree_cutoff + 1);
        if data.nrows() != expected || data.ncols() != 3 {
            return Err(SynthesisError::ShapeMismatch {
                rows: data.nrows(),
                expected,
            });
        }
        Ok(Self {
            degree_cutoff,
            data,
        })
    }

    /// Axis-aligned ellipsoid with semi-axes `a` (x), `b` (y), `c` (z),
    /// centred on the origin.
    ///
    /// The form lives in degree 1, so a cutoff of 0 is raised to
    /// [`MIN_DEGREE_CUTOFF`].
    #[must_use]
    pub fn ellipsoid(degree_cutoff: usize, a: f64, b: f64, c: f64) -> Self {
        let mut tensor = Self::zeros(degree_cutoff.max(MIN_DEGREE_CUTOFF));
        tensor.set_ellipsoid(a, b, c);
        tensor
    }

    /// Unit sphere centred on the origin.
    #[must_use]
    pub fn unit_sphere(degree_cutoff: usize) -> Self {
        Self::ellipsoid(degree_cutoff, 1.0, 1.0, 1.0)
    }

    /// Overwrites degrees 0 and 1 with a centred ellipsoid.
    ///
    /// `x = a sinθ cosφ`, `y = b sinθ sinφ` and `z = c cosθ` expressed in
    /// the orthonormal complex basis.
    pub(crate) fn set_ellipsoid(&mut self, a: f64, b: f64, c: f64) {
        let s = (2.0 * PI / 3.0).sqrt();
        let zero = Complex::new(0.0, 0.0);

        for axis in Axis::ALL {
            self.set(0, 0, axis, zero);
        }

        self.set(1, -1, Axis::X, Complex::new(a * s, 0.0));
        self.set(1, 0, Axis::X, zero);
        self.set(1, 1, Axis::X, Complex::new(-a * s, 0.0));

        self.set(1, -1, Axis::Y, Complex::new(0.0, b * s));
        self.set(1, 0, Axis::Y, zero);
        self.set(1, 1, Axis::Y, Complex::new(0.0, b * s));

        self.set(1, -1, Axis::Z, zero);
        self.set(1, 0, Axis::Z, Complex::new(c * (4.0 * PI / 3.0).sqrt(), 0.0));
        self.set(1, 1, Axis::Z, zero);
    }

    /// Row of degree `n`, order `m` in the packed layout.
    #[must_use]
    pub fn row(n: usize, m: i32) -> usize {
        debug_assert!(m.unsigned_abs() as usize <= n);
        let centre = n * n + n;
        if m >= 0 {
            centre + m.unsigned_abs() as usize
        } else {
            centre - m.unsigned_abs() as usize
        }
    }

    /// Highest degree stored.
    #[must_use]
    pub fn degree_cutoff(&self) -> usize {
        self.degree_cutoff
    }

    /// Packed `(L+1)^2 x 3` matrix.
    #[must_use]
    pub fn as_matrix(&self) -> &DMatrix<Complex> {
        &self.data
    }

    /// Coefficient for degree `n`, order `m` and `axis`.
    #[must_use]
    pub fn get(&self, n: usize, m: i32, axis: Axis) -> Complex {
        self.data[(Self::row(n, m), axis.index())]
    }

    /// Sets the coefficient for degree `n`, order `m` and `axis`.
    pub fn set(&mut self, n: usize, m: i32, axis: Axis, value: Complex) {
        self.data[(Self::row(n, m), axis.index())] = value;
    }

    /// Sum of `|c|^2` over every order and axis of degree `n`.
    ///
    /// Degrees above the cutoff hold no energy.
    #[must_use]
    pub fn degree_power(&self, n: usize) -> f64 {
        if n > self.degree_cutoff {
            return 0.0;
        }
        let start = n * n;
        let end = (n + 1) * (n + 1);
        self.data
            .rows(start, end - start)
            .iter()
            .map(num_complex::Complex::norm_sqr)
            .sum()
    }

    /// Sum of [`degree_power`](Self::degree_power) over `band`.
    #[must_use]
    pub fn band_power(&self, band: RangeInclusive<usize>) -> f64 {
        band.map(|n| self.degree_power(n)).sum()
    }

    /// Amplitude of degree `n` relative to the unit sphere's form.
    #[must_use]
    pub fn degree_amplitude(&self, n: usize) -> f64 {
        self.degree_power(n).sqrt() / unit_sphere_amplitude()
    }

    /// Sum of [`degree_amplitude`](Self::degree_amplitude) over `band`.
    ///
    /// For a freshly synthesized tensor this reproduces the band descriptor
    /// (times the multiplier) when the band lies within the cutoff.
    #[must_use]
    pub fn band_amplitude(&self, band: RangeInclusive<usize>) -> f64 {
        band.map(|n| self.degree_amplitude(n)).sum()
    }

    /// Multiplies every coefficient of degree `n` by `factor`.
    pub fn scale_degree(&mut self, n: usize, factor: f64) {
        if n > self.degree_cutoff {
            return;
        }
        let start = n * n;
        let count = 2 * n + 1;
        for c in self.data.rows_mut(start, count).iter_mut() {
            *c *= factor;
        }
    }

    /// Copy of this tensor truncated or zero-extended to `degree_cutoff`.
    #[must_use]
    pub fn with_degree_cutoff(&self, degree_cutoff: usize) -> Self {
        let mut out = Self::zeros(degree_cutoff);
        let rows = out.data.nrows().min(self.data.nrows());
        out.data
            .rows_mut(0, rows)
            .copy_from(&self.data.rows(0, rows));
        out
    }
}
