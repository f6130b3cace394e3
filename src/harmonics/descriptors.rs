use std::ops::RangeInclusive;

use crate::error::{ParameterError, Result};
use crate::math::check_range;

/// Power-law exponent of the angularity band.
pub const ANGULARITY_EXPONENT: f64 = 1.387;

/// Power-law exponent of the roughness band.
pub const ROUGHNESS_EXPONENT: f64 = 1.426;

/// Degrees whose amplitudes sum to the angularity descriptor `D2_8`.
pub const ANGULARITY_BAND: RangeInclusive<usize> = 2..=8;

/// Degrees whose amplitudes sum to the roughness descriptor `D9_15`.
///
/// Degrees above 15 continue the same power law.
pub const ROUGHNESS_BAND: RangeInclusive<usize> = 9..=15;

/// Degree cutoff used when none is given.
pub const DEFAULT_DEGREE_CUTOFF: usize = 16;

/// Lowest accepted cutoff; degree 1 carries the ellipsoidal form.
pub const MIN_DEGREE_CUTOFF: usize = 1;

/// Highest accepted cutoff. Evaluation cost grows with `(L+1)^2`.
pub const MAX_DEGREE_CUTOFF: usize = 64;

/// Sum of `k^(-exponent)` over `band`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn band_normalizer(band: RangeInclusive<usize>, exponent: f64) -> f64 {
    band.map(|k| (k as f64).powf(-exponent)).sum()
}

/// Validated shape controls for one particle.
///
/// * `elongation` (Ei): ratio of the intermediate to the long semi-axis, `(0, 1]`.
/// * `flatness` (Fi): ratio of the short to the intermediate semi-axis, `(0, 1]`.
/// * `angularity` (D2_8): sum of relative amplitudes over degrees 2-8, `>= 0`.
/// * `roughness` (D9_15): sum of relative amplitudes over degrees 9-15, `>= 0`.
/// * `degree_cutoff` (L): highest synthesized degree, `[1, 64]`.
/// * `multiplier`: gain on every degree above 1, `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphologyDescriptors {
    elongation: f64,
    flatness: f64,
    angularity: f64,
    roughness: f64,
    degree_cutoff: usize,
    multiplier: f64,
}

impl MorphologyDescriptors {
    /// Creates descriptors with the default cutoff and a unit multiplier.
    ///
    /// # Errors
    ///
    /// Returns a parameter error naming the first value out of range.
    pub fn new(elongation: f64, flatness: f64, angularity: f64, roughness: f64) -> Result<Self> {
        Self::builder()
            .elongation(elongation)
            .flatness(flatness)
            .angularity(angularity)
            .roughness(roughness)
            .build()
    }

    /// Starts a builder initialised to a smooth unit sphere.
    #[must_use]
    pub fn builder() -> DescriptorsBuilder {
        DescriptorsBuilder::default()
    }

    /// A smooth sphere: `Ei = Fi = 1`, no angularity or roughness.
    #[must_use]
    pub fn sphere() -> Self {
        Self {
            elongation: 1.0,
            flatness: 1.0,
            angularity: 0.0,
            roughness: 0.0,
            degree_cutoff: DEFAULT_DEGREE_CUTOFF,
            multiplier: 1.0,
        }
    }

    /// Returns a copy with a different degree cutoff.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the cutoff is outside `[1, 64]`.
    pub fn with_degree_cutoff(self, degree_cutoff: usize) -> Result<Self> {
        DescriptorsBuilder::from(self)
            .degree_cutoff(degree_cutoff)
            .build()
    }

    /// Returns a copy with a different multiplier.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the multiplier is below 1 or not finite.
    pub fn with_multiplier(self, multiplier: f64) -> Result<Self> {
        DescriptorsBuilder::from(self).multiplier(multiplier).build()
    }

    /// Elongation index Ei.
    #[must_use]
    pub fn elongation(&self) -> f64 {
        self.elongation
    }

    /// Flatness index Fi.
    #[must_use]
    pub fn flatness(&self) -> f64 {
        self.flatness
    }

    /// Angularity descriptor D2_8.
    #[must_use]
    pub fn angularity(&self) -> f64 {
        self.angularity
    }

    /// Roughness descriptor D9_15.
    #[must_use]
    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    /// Highest synthesized degree L.
    #[must_use]
    pub fn degree_cutoff(&self) -> usize {
        self.degree_cutoff
    }

    /// Gain applied to every degree above 1.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Semi-axes `(a, b, c)` of the base ellipsoid.
    ///
    /// `b = Ei * a`, `c = Fi * b` and `a * b * c = 1`, so the ellipsoid has
    /// the volume of the unit sphere.
    #[must_use]
    pub fn semi_axes(&self) -> (f64, f64, f64) {
        let a = (self.elongation * self.elongation * self.flatness).powf(-1.0 / 3.0);
        let b = self.elongation * a;
        let c = self.flatness * b;
        (a, b, c)
    }

    /// Target relative amplitude of degree `n` before the multiplier.
    ///
    /// Zero for degrees 0 and 1, which carry the form instead.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn degree_target(&self, n: usize) -> f64 {
        let nf = n as f64;
        if ANGULARITY_BAND.contains(&n) {
            self.angularity * nf.powf(-ANGULARITY_EXPONENT)
                / band_normalizer(ANGULARITY_BAND, ANGULARITY_EXPONENT)
        } else if n >= *ROUGHNESS_BAND.start() {
            self.roughness * nf.powf(-ROUGHNESS_EXPONENT)
                / band_normalizer(ROUGHNESS_BAND, ROUGHNESS_EXPONENT)
        } else {
            0.0
        }
    }

    /// Whether the cutoff reaches the roughness band at all.
    ///
    /// Below degree 9 the roughness descriptor has no effect.
    #[must_use]
    pub fn roughness_attainable(&self) -> bool {
        self.degree_cutoff >= *ROUGHNESS_BAND.start()
    }
}

impl Default for MorphologyDescriptors {
    fn default() -> Self {
        Self::sphere()
    }
}

/// Builder for [`MorphologyDescriptors`]; all checks run in [`build`](Self::build).
#[derive(Debug, Clone, Copy)]
pub struct DescriptorsBuilder {
    elongation: f64,
    flatness: f64,
    angularity: f64,
    roughness: f64,
    degree_cutoff: usize,
    multiplier: f64,
}

impl Default for DescriptorsBuilder {
    fn default() -> Self {
        MorphologyDescriptors::sphere().into()
    }
}

impl From<MorphologyDescriptors> for DescriptorsBuilder {
    fn from(d: MorphologyDescriptors) -> Self {
        Self {
            elongation: d.elongation,
            flatness: d.flatness,
            angularity: d.angularity,
            roughness: d.roughness,
            degree_cutoff: d.degree_cutoff,
            multiplier: d.multiplier,
        }
    }
}

impl DescriptorsBuilder {
    #[must_use]
    pub fn elongation(mut self, value: f64) -> Self {
        self.elongation = value;
        self
    }

    #[must_use]
    pub fn flatness(mut self, value: f64) -> Self {
        self.flatness = value;
        self
    }

    #[must_use]
    pub fn angularity(mut self, value: f64) -> Self {
        self.angularity = value;
        self
    }

    #[must_use]
    pub fn roughness(mut self, value: f64) -> Self {
        self.roughness = value;
        self
    }

    #[must_use]
    pub fn degree_cutoff(mut self, value: usize) -> Self {
        self.degree_cutoff = value;
        self
    }

    #[must_use]
    pub fn multiplier(mut self, value: f64) -> Self {
        self.multiplier = value;
        self
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns a parameter error naming the first value out of range.
    #[allow(clippy::cast_precision_loss)]
    pub fn build(self) -> Result<MorphologyDescriptors> {
        check_unit_fraction("elongation", self.elongation)?;
        check_unit_fraction("flatness", self.flatness)?;
        check_range("angularity", self.angularity, 0.0, f64::MAX)?;
        check_range("roughness", self.roughness, 0.0, f64::MAX)?;
        check_range("multiplier", self.multiplier, 1.0, f64::MAX)?;
        check_range(
            "degree_cutoff",
            self.degree_cutoff as f64,
            MIN_DEGREE_CUTOFF as f64,
            MAX_DEGREE_CUTOFF as f64,
        )?;

        Ok(MorphologyDescriptors {
            elongation: self.elongation,
            flatness: self.flatness,
            angularity: self.angularity,
            roughness: self.roughness,
            degree_cutoff: self.degree_cutoff,
            multiplier: self.multiplier,
        })
    }
}

/// Accepts `(0, 1]`.
fn check_unit_fraction(parameter: &'static str, value: f64) -> std::result::Result<(), ParameterError> {
    check_range(parameter, value, 0.0, 1.0)?;
    if value <= 0.0 {
        return Err(ParameterError::OutOfRange {
            parameter,
            value,
            min: f64::MIN_POSITIVE,
            max: 1.0,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShpsgError;
    use approx::assert_relative_eq;

    fn offending(result: Result<MorphologyDescriptors>) -> &'static str {
        match result {
            Err(ShpsgError::Parameter(
                ParameterError::OutOfRange { parameter, .. }
                | ParameterError::NotFinite { parameter, .. },
            )) => parameter,
            other => panic!("expected parameter error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_documented_ranges() {
        let d = MorphologyDescriptors::new(0.8, 0.9, 0.2, 0.1).unwrap();
        assert_eq!(d.degree_cutoff(), DEFAULT_DEGREE_CUTOFF);
        assert_relative_eq!(d.multiplier(), 1.0);
        assert!(MorphologyDescriptors::new(1.0, 1.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn names_offending_parameter() {
        assert_eq!(offending(MorphologyDescriptors::new(0.0, 0.9, 0.2, 0.1)), "elongation");
        assert_eq!(offending(MorphologyDescriptors::new(0.8, 1.2, 0.2, 0.1)), "flatness");
        assert_eq!(offending(MorphologyDescriptors::new(0.8, 0.9, -0.1, 0.1)), "angularity");
        assert_eq!(offending(MorphologyDescriptors::new(0.8, 0.9, 0.2, f64::NAN)), "roughness");
        let base = MorphologyDescriptors::sphere();
        assert_eq!(offending(base.with_multiplier(0.5)), "multiplier");
        assert_eq!(offending(base.with_degree_cutoff(0)), "degree_cutoff");
        assert_eq!(offending(base.with_degree_cutoff(65)), "degree_cutoff");
    }

    #[test]
    fn low_cutoff_is_valid_but_drops_roughness() {
        let d = MorphologyDescriptors::new(0.8, 0.9, 0.2, 0.1)
            .unwrap()
            .with_degree_cutoff(8)
            .unwrap();
        assert!(!d.roughness_attainable());
        assert!(MorphologyDescriptors::sphere().roughness_attainable());
    }

    #[test]
    fn semi_axes_preserve_volume_and_ratios() {
        let d = MorphologyDescriptors::new(0.7, 0.6, 0.0, 0.0).unwrap();
        let (a, b, c) = d.semi_axes();
        assert_relative_eq!(a * b * c, 1.0, epsilon = 1e-12);
        assert_relative_eq!(b / a, 0.7, epsilon = 1e-12);
        assert_relative_eq!(c / b, 0.6, epsilon = 1e-12);
        assert_eq!(MorphologyDescriptors::sphere().semi_axes(), (1.0, 1.0, 1.0));
    }

    #[test]
    fn band_targets_sum_to_descriptor() {
        let d = MorphologyDescriptors::new(1.0, 1.0, 0.3, 0.12).unwrap();
        let angular: f64 = ANGULARITY_BAND.map(|n| d.degree_target(n)).sum();
        let rough: f64 = ROUGHNESS_BAND.map(|n| d.degree_target(n)).sum();
        assert_relative_eq!(angular, 0.3, epsilon = 1e-12);
        assert_relative_eq!(rough, 0.12, epsilon = 1e-12);
        assert_eq!(d.degree_target(1), 0.0);
    }

    #[test]
    fn targets_decay_within_band() {
        let d = MorphologyDescriptors::new(1.0, 1.0, 0.3, 0.12).unwrap();
        for n in 2..8 {
            assert!(d.degree_target(n) > d.degree_target(n + 1));
        }
        for n in 9..30 {
            assert!(d.degree_target(n) > d.degree_target(n + 1));
        }
    }
}
