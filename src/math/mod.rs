pub mod legendre;
pub mod spherical;

pub use spherical::{to_spherical, SphericalCoord};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Complex scalar used for harmonic coefficients.
pub type Complex = num_complex::Complex<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Rejects non-finite values and values outside `[min, max]`.
pub(crate) fn check_range(
    parameter: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> std::result::Result<(), crate::error::ParameterError> {
    use crate::error::ParameterError;

    if !value.is_finite() {
        return Err(ParameterError::NotFinite { parameter, value });
    }
    if value < min || value > max {
        return Err(ParameterError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}
