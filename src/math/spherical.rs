use std::f64::consts::TAU;

use super::{Point3, TOLERANCE};

/// Angular position of a direction on the unit sphere.
///
/// `theta` is the colatitude in `[0, pi]` measured from `+z`, `phi` the
/// azimuth in `[0, 2*pi)` measured from `+x` towards `+y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoord {
    /// Colatitude.
    pub theta: f64,
    /// Azimuth.
    pub phi: f64,
}

impl SphericalCoord {
    /// Creates a coordinate pair without validation.
    #[must_use]
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Computes the angular position of `point` as seen from the origin.
    ///
    /// The point is normalized first, so any non-zero point works. At the
    /// poles (and for the origin itself) the azimuth is defined as zero.
    #[must_use]
    pub fn from_point(point: &Point3) -> Self {
        let len = point.coords.norm();
        if len < TOLERANCE {
            return Self::new(0.0, 0.0);
        }
        let dir = point.coords / len;
        let theta = dir.z.clamp(-1.0, 1.0).acos();

        if dir.x.hypot(dir.y) < TOLERANCE {
            return Self::new(theta, 0.0);
        }

        let mut phi = dir.y.atan2(dir.x);
        if phi < 0.0 {
            phi += TAU;
        }
        // -tiny + 2pi rounds to 2pi exactly.
        if phi >= TAU {
            phi = 0.0;
        }
        Self::new(theta, phi)
    }

    /// Unit vector pointing in this direction.
    #[must_use]
    pub fn to_unit_point(&self) -> Point3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Point3::new(st * cp, st * sp, ct)
    }
}

/// Converts every vertex to its angular coordinates, preserving order.
#[must_use]
pub fn to_spherical(vertices: &[Point3]) -> Vec<SphericalCoord> {
    vertices.iter().map(SphericalCoord::from_point).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn axes_map_to_expected_angles() {
        let c = SphericalCoord::from_point(&p(1.0, 0.0, 0.0));
        assert_relative_eq!(c.theta, FRAC_PI_2);
        assert_relative_eq!(c.phi, 0.0);

        let c = SphericalCoord::from_point(&p(0.0, 1.0, 0.0));
        assert_relative_eq!(c.phi, FRAC_PI_2);

        let c = SphericalCoord::from_point(&p(0.0, -1.0, 0.0));
        assert_relative_eq!(c.phi, 1.5 * PI);

        let c = SphericalCoord::from_point(&p(-1.0, 0.0, 0.0));
        assert_relative_eq!(c.phi, PI);
    }

    #[test]
    fn poles_have_zero_azimuth() {
        let north = SphericalCoord::from_point(&p(0.0, 0.0, 1.0));
        let south = SphericalCoord::from_point(&p(0.0, 0.0, -1.0));
        assert_eq!(north, SphericalCoord::new(0.0, 0.0));
        assert_relative_eq!(south.theta, PI);
        assert_eq!(south.phi, 0.0);
        assert!(!south.phi.is_nan());
    }

    #[test]
    fn azimuth_stays_below_tau() {
        let c = SphericalCoord::from_point(&p(1.0, -1e-300, 0.0));
        assert!(c.phi >= 0.0 && c.phi < TAU);
    }

    #[test]
    fn round_trips_through_unit_point() {
        let original = p(0.3, -0.5, 0.81).coords.normalize();
        let c = SphericalCoord::from_point(&Point3::from(original));
        let back = c.to_unit_point();
        assert_relative_eq!(back.coords, original, epsilon = 1e-12);
    }

    #[test]
    fn preserves_order_and_count() {
        let pts = vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 0.0, -2.0)];
        let coords = to_spherical(&pts);
        assert_eq!(coords.len(), 3);
        assert_relative_eq!(coords[1].theta, FRAC_PI_2);
        assert_relative_eq!(coords[2].theta, PI);
    }
}
