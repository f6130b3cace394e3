//! Particle configuration (`particle.toml`).
//!
//! Every field is optional in the file; missing fields take the defaults
//! below, which describe a smooth sphere of diameter 60 written to
//! `particle.stl`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::export::check_diameter;
use crate::harmonics::{MorphologyDescriptors, DEFAULT_DEGREE_CUTOFF};
use crate::math::check_range;
use crate::mesh::MAX_SUBDIVISION_LEVEL;
use crate::particle::ParticleCategory;

/// Inputs for generating one particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Elongation index Ei, `(0, 1]` (default: 1.0)
    #[serde(default = "default_one")]
    pub elongation: f64,
    /// Flatness index Fi, `(0, 1]` (default: 1.0)
    #[serde(default = "default_one")]
    pub flatness: f64,
    /// Angularity descriptor D2_8 (default: 0.0)
    #[serde(default)]
    pub angularity: f64,
    /// Roughness descriptor D9_15 (default: 0.0)
    #[serde(default)]
    pub roughness: f64,
    /// Highest harmonic degree, `[1, 64]` (default: 16)
    #[serde(default = "default_degree_cutoff")]
    pub degree_cutoff: usize,
    /// Gain on degrees above 1, `>= 1` (default: 1.0)
    #[serde(default = "default_one")]
    pub multiplier: f64,
    /// Volume-equivalent diameter of the exported particle (default: 60.0)
    #[serde(default = "default_target_diameter")]
    pub target_diameter: f64,
    /// Icosahedron subdivision level of the sampling mesh (default: 2)
    #[serde(default = "default_subdivision_level")]
    pub subdivision_level: u32,
    /// Destination STL file (default: `particle.stl`)
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Seed for the coefficient generator; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Category label recorded with the particle, if any
    #[serde(default)]
    pub category: Option<ParticleCategory>,
}

fn default_one() -> f64 {
    1.0
}
fn default_degree_cutoff() -> usize {
    DEFAULT_DEGREE_CUTOFF
}
fn default_target_diameter() -> f64 {
    60.0
}
fn default_subdivision_level() -> u32 {
    2
}
fn default_output() -> PathBuf {
    PathBuf::from("particle.stl")
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            elongation: default_one(),
            flatness: default_one(),
            angularity: 0.0,
            roughness: 0.0,
            degree_cutoff: default_degree_cutoff(),
            multiplier: default_one(),
            target_diameter: default_target_diameter(),
            subdivision_level: default_subdivision_level(),
            output: default_output(),
            seed: None,
            category: None,
        }
    }
}

impl FromStr for ParticleConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl ParticleConfig {
    /// Loads a configuration file.
    ///
    /// Values are not range-checked here; see [`ParticleConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read or is not valid
    /// TOML for this structure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = text.parse::<Self>().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Replaces the shape fields with `descriptors`.
    #[must_use]
    pub fn with_descriptors(mut self, descriptors: &MorphologyDescriptors) -> Self {
        self.elongation = descriptors.elongation();
        self.flatness = descriptors.flatness();
        self.angularity = descriptors.angularity();
        self.roughness = descriptors.roughness();
        self.degree_cutoff = descriptors.degree_cutoff();
        self.multiplier = descriptors.multiplier();
        self
    }

    /// Validated shape descriptors.
    ///
    /// # Errors
    ///
    /// Returns a parameter error naming the first value out of range.
    pub fn descriptors(&self) -> Result<MorphologyDescriptors> {
        MorphologyDescriptors::builder()
            .elongation(self.elongation)
            .flatness(self.flatness)
            .angularity(self.angularity)
            .roughness(self.roughness)
            .degree_cutoff(self.degree_cutoff)
            .multiplier(self.multiplier)
            .build()
    }

    /// Checks every numeric field.
    ///
    /// # Errors
    ///
    /// Returns a parameter error naming the first value out of range.
    pub fn validate(&self) -> Result<()> {
        self.descriptors()?;
        check_diameter(self.target_diameter)?;
        check_range(
            "subdivision_level",
            f64::from(self.subdivision_level),
            0.0,
            f64::from(MAX_SUBDIVISION_LEVEL),
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ParameterError, ShpsgError};

    #[test]
    fn empty_file_gives_defaults() {
        let config: ParticleConfig = "".parse().unwrap();
        assert_eq!(config, ParticleConfig::default());
        assert_eq!(config.descriptors().unwrap(), MorphologyDescriptors::sphere());
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config: ParticleConfig = r#"
            elongation = 0.7
            roughness = 0.12
            degree_cutoff = 24
            output = "out/p.stl"
            seed = 42
            category = "weird"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.elongation, 0.7);
        assert_eq!(config.flatness, 1.0);
        assert_eq!(config.roughness, 0.12);
        assert_eq!(config.degree_cutoff, 24);
        assert_eq!(config.output, PathBuf::from("out/p.stl"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.category, Some(ParticleCategory::Weird));
    }

    #[test]
    fn validate_names_the_offending_field() {
        let config = ParticleConfig {
            target_diameter: -1.0,
            ..ParticleConfig::default()
        };
        match config.validate().unwrap_err() {
            ShpsgError::Parameter(ParameterError::OutOfRange { parameter, .. }) => {
                assert_eq!(parameter, "target_diameter");
            }
            other => panic!("unexpected error: {other}"),
        }

        let config = ParticleConfig {
            subdivision_level: 9,
            ..ParticleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn with_descriptors_round_trips() {
        let d = MorphologyDescriptors::new(0.6, 0.5, 0.2, 0.1)
            .unwrap()
            .with_multiplier(2.0)
            .unwrap();
        let config = ParticleConfig::default().with_descriptors(&d);
        assert_eq!(config.descriptors().unwrap(), d);
    }

    #[test]
    fn load_reports_read_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            ParticleConfig::load(&missing).unwrap_err(),
            ShpsgError::Config(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "elongation = \"tall\"").unwrap();
        assert!(matches!(
            ParticleConfig::load(&bad).unwrap_err(),
            ShpsgError::Config(ConfigError::Parse { .. })
        ));

        let good = dir.path().join("good.toml");
        fs::write(&good, "flatness = 0.5\n").unwrap();
        assert_eq!(ParticleConfig::load(&good).unwrap().flatness, 0.5);
    }
}
