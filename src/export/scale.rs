use crate::error::Result;
use crate::math::check_range;
use crate::surface::ParticleSurface;

/// Rescales a unit-radius surface to a physical equivalent diameter.
///
/// Evaluated surfaces have a volume-equivalent radius of 1, so every
/// coordinate is multiplied by `target_diameter / 2`.
pub struct ScaleSurface<'a> {
    surface: &'a ParticleSurface,
    target_diameter: f64,
}

impl<'a> ScaleSurface<'a> {
    /// Creates a new `ScaleSurface` operation.
    #[must_use]
    pub fn new(surface: &'a ParticleSurface, target_diameter: f64) -> Self {
        Self {
            surface,
            target_diameter,
        }
    }

    /// Executes the scaling, returning a new surface.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the diameter is not finite and positive.
    pub fn execute(&self) -> Result<ParticleSurface> {
        check_diameter(self.target_diameter)?;
        Ok(self.surface.scaled(self.target_diameter / 2.0))
    }
}

pub(crate) fn check_diameter(target_diameter: f64) -> Result<()> {
    check_range("target_diameter", target_diameter, f64::MIN_POSITIVE, f64::MAX)?;
    Ok(())
}
