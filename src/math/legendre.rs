//! Fully normalized associated Legendre functions.
//!
//! Values are scaled so that `Y_n^m(θ, φ) = P̄_n^m(cos θ) · e^{imφ}` is the
//! orthonormal complex spherical harmonic, Condon-Shortley phase included.
//! The three-term recurrence on normalized values avoids the factorial
//! ratios of the textbook definition and stays finite well past degree 64.

use std::f64::consts::PI;

/// Table of `P̄_n^m(cos θ)` for `0 <= m <= n <= degree` at a single angle.
#[derive(Debug, Clone)]
pub struct LegendreTable {
    degree: usize,
    values: Vec<f64>,
}

impl LegendreTable {
    /// Creates a zeroed table for degrees `0..=degree`.
    #[must_use]
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            values: vec![0.0; (degree + 1) * (degree + 2) / 2],
        }
    }

    /// Creates a table already filled for colatitude `theta`.
    #[must_use]
    pub fn at(degree: usize, theta: f64) -> Self {
        let mut table = Self::new(degree);
        table.fill(theta);
        table
    }

    /// Highest degree held by the table.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns `P̄_n^m` for `0 <= m <= n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the table degree or `m > n`.
    #[must_use]
    pub fn get(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.degree);
        self.values[Self::index(n, m)]
    }

    /// Recomputes every entry for colatitude `theta`.
    #[allow(clippy::cast_precision_loss)]
    pub fn fill(&mut self, theta: f64) {
        let x = theta.cos();
        // sin θ is non-negative on [0, π]; clamp guards round-off at the poles.
        let s = theta.sin().max(0.0);
        let lmax = self.degree;

        self.values[0] = 1.0 / (4.0 * PI).sqrt();

        // Sectoral terms P̄_m^m.
        for m in 1..=lmax {
            let mf = m as f64;
            let prev = self.values[Self::index(m - 1, m - 1)];
            self.values[Self::index(m, m)] = -((2.0 * mf + 1.0) / (2.0 * mf)).sqrt() * s * prev;
        }

        // First off-diagonal P̄_{m+1}^m.
        for m in 0..lmax {
            let mf = m as f64;
            let diag = self.values[Self::index(m, m)];
            self.values[Self::index(m + 1, m)] = (2.0 * mf + 3.0).sqrt() * x * diag;
        }

        // Remaining terms by upward recurrence in n.
        for m in 0..=lmax {
            let mf = m as f64;
            for n in (m + 2)..=lmax {
                let nf = n as f64;
                let a = ((4.0 * nf * nf - 1.0) / (nf * nf - mf * mf)).sqrt();
                let b = (((nf - 1.0) * (nf - 1.0) - mf * mf)
                    / (4.0 * (nf - 1.0) * (nf - 1.0) - 1.0))
                    .sqrt();
                let p1 = self.values[Self::index(n - 1, m)];
                let p2 = self.values[Self::index(n - 2, m)];
                self.values[Self::index(n, m)] = a * (x * p1 - b * p2);
            }
        }
    }

    fn index(n: usize, m: usize) -> usize {
        n * (n + 1) / 2 + m
    }
}
