//! Physical scaling and binary STL output.

mod scale;
mod stl;

pub(crate) use scale::check_diameter;
pub use scale::ScaleSurface;
pub use stl::{
    decode, encode, read_stl, StlSolid, StlTriangle, WriteStl, HEADER_LEN, TRIANGLE_RECORD_LEN,
};

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::surface::ParticleSurface;

/// Scales a unit-size surface to `target_diameter` and writes it as binary
/// STL to `destination`.
///
/// The destination is replaced atomically; on failure no partial file is
/// left behind.
pub struct ExportSurface<'a> {
    surface: &'a ParticleSurface,
    target_diameter: f64,
    destination: PathBuf,
}

impl<'a> ExportSurface<'a> {
    /// Creates a new `ExportSurface` operation.
    #[must_use]
    pub fn new(
        surface: &'a ParticleSurface,
        target_diameter: f64,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            surface,
            target_diameter,
            destination: destination.into(),
        }
    }

    /// The file this operation writes to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Executes the export, returning the scaled surface that was written.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for an invalid diameter, or an export
    /// error if the file cannot be written.
    pub fn execute(&self) -> Result<ParticleSurface> {
        let scaled = ScaleSurface::new(self.surface, self.target_diameter).execute()?;
        WriteStl::new(&scaled, &self.destination)
            .with_header(format!(
                "shpsg particle, equivalent diameter {}",
                self.target_diameter
            ))
            .execute()?;
        Ok(scaled)
    }
}
