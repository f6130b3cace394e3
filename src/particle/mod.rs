//! One-particle pipeline: synthesize, evaluate, scale and export.

mod recipe;

pub use recipe::{
    ParticleCategory, ParticleRecipe, RecipeDraw, DIAMETER_RANGE, GRADUAL_GROUP_SIZE,
};

use std::fmt;
use std::path::PathBuf;

use rand::Rng;
use tracing::debug;

use crate::config::ParticleConfig;
use crate::error::Result;
use crate::export::{check_diameter, ExportSurface, ScaleSurface};
use crate::harmonics::{EvaluateSurface, MorphologyDescriptors, SynthesizeCoefficients};
use crate::mesh::SamplingMesh;
use crate::surface::ParticleSurface;

/// Half-width of the preview axes, as a fraction of the diameter.
pub const PREVIEW_EXTENT_FACTOR: f64 = 0.6;

/// Coarse form classification from Ei and Fi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    Spherical,
    Prolate,
    Oblate,
    Mixed,
}

impl ShapeClass {
    #[must_use]
    pub fn classify(elongation: f64, flatness: f64) -> Self {
        if elongation >= 0.9 && flatness >= 0.9 {
            Self::Spherical
        } else if elongation < 0.8 && flatness >= 0.85 {
            Self::Prolate
        } else if elongation >= 0.85 && flatness < 0.8 {
            Self::Oblate
        } else {
            Self::Mixed
        }
    }
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spherical => "spherical",
            Self::Prolate => "prolate",
            Self::Oblate => "oblate",
            Self::Mixed => "mixed",
        })
    }
}

/// Coarse surface texture classification from D9_15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceClass {
    Smooth,
    ModeratelyRough,
    VeryRough,
}

impl SurfaceClass {
    #[must_use]
    pub fn classify(roughness: f64) -> Self {
        if roughness < 0.05 {
            Self::Smooth
        } else if roughness < 0.10 {
            Self::ModeratelyRough
        } else {
            Self::VeryRough
        }
    }
}

impl fmt::Display for SurfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Smooth => "smooth",
            Self::ModeratelyRough => "moderately rough",
            Self::VeryRough => "very rough",
        })
    }
}

/// Summary of one generated particle, returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    /// Volume-equivalent diameter the surface was scaled to.
    pub target_diameter: f64,
    /// Descriptors the coefficients were synthesized from.
    pub descriptors: MorphologyDescriptors,
    pub category: Option<ParticleCategory>,
    /// File the surface was written to.
    pub path: PathBuf,
    pub triangle_count: usize,
    /// Smallest and largest vertex distance from the centroid after scaling.
    pub radius_range: (f64, f64),
}

impl ParticleRecord {
    /// Axis half-extent for previews: the particle fits in
    /// `[-0.6 D, 0.6 D]` on every axis for moderate descriptors.
    #[must_use]
    pub fn preview_half_extent(&self) -> f64 {
        PREVIEW_EXTENT_FACTOR * self.target_diameter
    }

    #[must_use]
    pub fn shape_class(&self) -> ShapeClass {
        ShapeClass::classify(self.descriptors.elongation(), self.descriptors.flatness())
    }

    #[must_use]
    pub fn surface_class(&self) -> SurfaceClass {
        SurfaceClass::classify(self.descriptors.roughness())
    }
}

/// Generates one particle from a configuration on a shared sampling mesh.
///
/// All inputs are validated before any coefficient is drawn. The sampling
/// mesh is only read, so one mesh can serve many concurrent pipelines.
pub struct GenerateParticle<'a> {
    sampling: &'a SamplingMesh,
    config: &'a ParticleConfig,
}

impl<'a> GenerateParticle<'a> {
    /// Creates a new `GenerateParticle` operation.
    #[must_use]
    pub fn new(sampling: &'a SamplingMesh, config: &'a ParticleConfig) -> Self {
        Self { sampling, config }
    }

    /// Generates the scaled surface in memory without writing a file.
    ///
    /// # Errors
    ///
    /// Returns a parameter error for invalid configuration values, or an
    /// evaluation error if the sampling mesh is inconsistent.
    pub fn surface<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParticleSurface> {
        let descriptors = self.validated()?;
        let unit = self.unit_surface(descriptors, rng)?;
        ScaleSurface::new(&unit, self.config.target_diameter).execute()
    }

    /// Generates the particle and writes it to the configured output path.
    ///
    /// # Errors
    ///
    /// Returns an error tagged with the failing stage: parameter
    /// validation, evaluation or export.
    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParticleRecord> {
        let descriptors = self.validated()?;
        let unit = self.unit_surface(descriptors, rng)?;
        let scaled =
            ExportSurface::new(&unit, self.config.target_diameter, &self.config.output).execute()?;

        let record = ParticleRecord {
            target_diameter: self.config.target_diameter,
            descriptors,
            category: self.config.category,
            path: self.config.output.clone(),
            triangle_count: scaled.mesh().triangle_count(),
            radius_range: scaled.radius_range().unwrap_or((0.0, 0.0)),
        };
        debug!(
            path = %record.path.display(),
            diameter = record.target_diameter,
            shape = %record.shape_class(),
            surface = %record.surface_class(),
            "particle generated"
        );
        Ok(record)
    }

    fn validated(&self) -> Result<MorphologyDescriptors> {
        let descriptors = self.config.descriptors()?;
        check_diameter(self.config.target_diameter)?;
        Ok(descriptors)
    }

    fn unit_surface<R: Rng + ?Sized>(
        &self,
        descriptors: MorphologyDescriptors,
        rng: &mut R,
    ) -> Result<ParticleSurface> {
        let coefficients = SynthesizeCoefficients::new(descriptors).execute(rng);
        EvaluateSurface::new(&coefficients).execute(self.sampling)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ParameterError, ShpsgError};
    use crate::export::read_stl;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn config(dir: &tempfile::TempDir) -> ParticleConfig {
        ParticleConfig {
            elongation: 0.8,
            flatness: 0.7,
            angularity: 0.2,
            roughness: 0.08,
            target_diameter: 45.0,
            output: dir.path().join("p.stl"),
            category: Some(ParticleCategory::Standard),
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn execute_writes_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let sampling = SamplingMesh::new(2).unwrap();
        let config = config(&dir);
        let record = GenerateParticle::new(&sampling, &config)
            .execute(&mut Pcg64::seed_from_u64(4))
            .unwrap();

        assert_eq!(record.triangle_count, 320);
        assert_eq!(record.category, Some(ParticleCategory::Standard));
        assert_relative_eq!(record.preview_half_extent(), 27.0);
        assert_eq!(record.shape_class(), ShapeClass::Mixed);
        assert_eq!(record.surface_class(), SurfaceClass::ModeratelyRough);
        let (lo, hi) = record.radius_range;
        assert!(lo > 0.0 && lo < hi);

        let solid = read_stl(&record.path).unwrap();
        assert_eq!(solid.triangles.len(), 320);
    }

    #[test]
    fn in_memory_surface_matches_export() {
        let dir = tempfile::tempdir().unwrap();
        let sampling = SamplingMesh::new(1).unwrap();
        let config = config(&dir);
        let op = GenerateParticle::new(&sampling, &config);

        let surface = op.surface(&mut Pcg64::seed_from_u64(8)).unwrap();
        let record = op.execute(&mut Pcg64::seed_from_u64(8)).unwrap();
        assert_eq!(surface.radius_range().unwrap(), record.radius_range);
    }

    #[test]
    fn invalid_config_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let sampling = SamplingMesh::new(0).unwrap();
        let config = ParticleConfig {
            flatness: 1.5,
            ..config(&dir)
        };
        let err = GenerateParticle::new(&sampling, &config)
            .execute(&mut Pcg64::seed_from_u64(0))
            .unwrap_err();
        match err {
            ShpsgError::Parameter(ParameterError::OutOfRange { parameter, .. }) => {
                assert_eq!(parameter, "flatness");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!config.output.exists());
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(ShapeClass::classify(0.95, 0.92), ShapeClass::Spherical);
        assert_eq!(ShapeClass::classify(0.7, 0.9), ShapeClass::Prolate);
        assert_eq!(ShapeClass::classify(0.9, 0.6), ShapeClass::Oblate);
        assert_eq!(ShapeClass::classify(0.5, 0.5), ShapeClass::Mixed);
        assert_eq!(SurfaceClass::classify(0.0), SurfaceClass::Smooth);
        assert_eq!(SurfaceClass::classify(0.07), SurfaceClass::ModeratelyRough);
        assert_eq!(SurfaceClass::classify(0.15), SurfaceClass::VeryRough);
    }
}
