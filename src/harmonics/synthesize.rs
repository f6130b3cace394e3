use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use crate::math::Complex;

use super::{
    unit_sphere_amplitude, Axis, CoefficientTensor, MorphologyDescriptors, ANGULARITY_BAND,
    ROUGHNESS_BAND,
};

/// Generates a random coefficient tensor matching a set of descriptors.
///
/// Degree 1 is the deterministic ellipsoid from Ei and Fi. Every degree
/// `n >= 2` is drawn as independent standard-normal complex values (one per
/// order and axis) and then rescaled so that its relative amplitude equals
/// [`MorphologyDescriptors::degree_target`], times the multiplier.
///
/// Degrees are drawn in ascending order and each target depends only on
/// `n`, so with the same generator state a higher cutoff reproduces every
/// lower degree exactly and only appends new ones.
pub struct SynthesizeCoefficients {
    descriptors: MorphologyDescriptors,
}

impl SynthesizeCoefficients {
    /// Creates a new `SynthesizeCoefficients` operation.
    #[must_use]
    pub fn new(descriptors: MorphologyDescriptors) -> Self {
        Self { descriptors }
    }

    /// Executes the synthesis using `rng` as the only source of randomness.
    #[must_use]
    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> CoefficientTensor {
        let d = &self.descriptors;
        let cutoff = d.degree_cutoff();

        if !d.roughness_attainable() && d.roughness() > 0.0 {
            warn!(
                degree_cutoff = cutoff,
                roughness = d.roughness(),
                "degree cutoff below the roughness band; roughness target ignored"
            );
        }

        let (a, b, c) = d.semi_axes();
        let mut tensor = CoefficientTensor::ellipsoid(cutoff, a, b, c);

        for n in 2..=cutoff {
            draw_degree(&mut tensor, n, rng);

            let raw = tensor.degree_power(n).sqrt();
            let target = d.degree_target(n) * d.multiplier() * unit_sphere_amplitude();
            let factor = if raw > 0.0 { target / raw } else { 0.0 };
            tensor.scale_degree(n, factor);
        }

        debug!(
            degree_cutoff = cutoff,
            angularity = tensor.band_amplitude(ANGULARITY_BAND),
            roughness = tensor.band_amplitude(ROUGHNESS_BAND),
            "synthesized coefficients"
        );
        tensor
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_degree<R: Rng + ?Sized>(tensor: &mut CoefficientTensor, n: usize, rng: &mut R) {
    let n_signed = n as i32;
    for m in -n_signed..=n_signed {
        for axis in Axis::ALL {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            tensor.set(n, m, axis, Complex::new(re, im));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn descriptors(d2_8: f64, d9_15: f64) -> MorphologyDescriptors {
        MorphologyDescriptors::new(0.8, 0.7, d2_8, d9_15).unwrap()
    }

    #[test]
    fn bands_hit_descriptor_targets() {
        let d = descriptors(0.25, 0.1);
        let t = SynthesizeCoefficients::new(d).execute(&mut Pcg64::seed_from_u64(7));
        assert_eq!(t.degree_cutoff(), 16);
        assert_relative_eq!(t.band_amplitude(ANGULARITY_BAND), 0.25, epsilon = 1e-12);
        assert_relative_eq!(t.band_amplitude(ROUGHNESS_BAND), 0.1, epsilon = 1e-12);
        assert_eq!(t.degree_power(0), 0.0);
    }

    #[test]
    fn multiplier_scales_detail_but_not_form() {
        let d = descriptors(0.2, 0.1).with_multiplier(5.0).unwrap();
        let t = SynthesizeCoefficients::new(d).execute(&mut Pcg64::seed_from_u64(3));
        assert_relative_eq!(t.band_amplitude(ANGULARITY_BAND), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.band_amplitude(ROUGHNESS_BAND), 0.5, epsilon = 1e-12);

        let (a, b, c) = d.semi_axes();
        let form = CoefficientTensor::ellipsoid(1, a, b, c);
        assert_relative_eq!(t.degree_power(1), form.degree_power(1), epsilon = 1e-12);
    }

    #[test]
    fn raising_cutoff_only_appends_degrees() {
        let base = descriptors(0.3, 0.15);
        let low = SynthesizeCoefficients::new(base.with_degree_cutoff(12).unwrap())
            .execute(&mut Pcg64::seed_from_u64(11));
        let high = SynthesizeCoefficients::new(base.with_degree_cutoff(20).unwrap())
            .execute(&mut Pcg64::seed_from_u64(11));

        assert_eq!(high.with_degree_cutoff(12), low);
        assert!(high.band_power(13..=20) > 0.0);
    }

    #[test]
    fn roughness_power_grows_with_descriptor() {
        let mut previous = 0.0;
        for d9_15 in [0.0, 0.05, 0.1, 0.2, 0.4] {
            let t = SynthesizeCoefficients::new(descriptors(0.2, d9_15))
                .execute(&mut Pcg64::seed_from_u64(5));
            let power = t.band_power(9..=16);
            if d9_15 > 0.0 {
                assert!(power > previous, "D9_15 = {d9_15}");
            }
            previous = power;
        }
    }

    #[test]
    fn cutoff_below_roughness_band_leaves_it_empty() {
        let d = descriptors(0.2, 0.1).with_degree_cutoff(8).unwrap();
        let t = SynthesizeCoefficients::new(d).execute(&mut Pcg64::seed_from_u64(1));
        assert_eq!(t.degree_cutoff(), 8);
        assert_eq!(t.band_power(ROUGHNESS_BAND), 0.0);
        assert_relative_eq!(t.band_amplitude(ANGULARITY_BAND), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn unseeded_draws_differ_but_share_targets() {
        let d = descriptors(0.2, 0.1);
        let first = SynthesizeCoefficients::new(d).execute(&mut rand::rng());
        let second = SynthesizeCoefficients::new(d).execute(&mut rand::rng());
        assert_ne!(first, second);
        for t in [&first, &second] {
            assert_relative_eq!(t.band_amplitude(ANGULARITY_BAND), 0.2, epsilon = 1e-12);
            assert_relative_eq!(t.band_amplitude(ROUGHNESS_BAND), 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn smooth_sphere_has_no_detail() {
        let d = MorphologyDescriptors::sphere().with_degree_cutoff(9).unwrap();
        let t = SynthesizeCoefficients::new(d).execute(&mut Pcg64::seed_from_u64(0));
        assert_eq!(t.band_power(2..=9), 0.0);
        assert_eq!(t, CoefficientTensor::unit_sphere(9));
    }
}
