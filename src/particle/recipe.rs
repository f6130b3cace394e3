use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};
use crate::harmonics::{MorphologyDescriptors, DEFAULT_DEGREE_CUTOFF};

/// Equivalent diameter range shared by every category.
pub const DIAMETER_RANGE: RangeInclusive<f64> = 30.0..=90.0;

/// Particles per step of the gradual category.
pub const GRADUAL_GROUP_SIZE: usize = 10;

/// Ei/Fi centres of the gradual category, from near-spherical to extreme.
const GRADUAL_ANCHORS: [f64; 5] = [0.9, 0.75, 0.65, 0.55, 0.4];

/// Named particle families with their own descriptor distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleCategory {
    /// Moderately irregular sand-like grains at the default cutoff.
    Standard,
    /// Rock-like grains with a low cutoff (8-12).
    Regular,
    /// Extreme aspect ratios with amplified high-degree detail.
    Weird,
    /// Morphology that worsens with particle index, in groups of ten.
    Gradual,
}

impl ParticleCategory {
    /// Every category, in declaration order.
    pub const ALL: [ParticleCategory; 4] = [Self::Standard, Self::Regular, Self::Weird, Self::Gradual];

    /// Lowercase name used in files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Regular => "regular",
            Self::Weird => "weird",
            Self::Gradual => "gradual",
        }
    }

    /// Conventional output file stem for the `index`-th particle (0-based).
    #[must_use]
    pub fn file_stem(self, index: usize) -> String {
        match self {
            Self::Standard | Self::Gradual => format!("particle_{index:04}"),
            Self::Regular => format!("particle_reg_{:02}", index + 1),
            Self::Weird => format!("particle_weird_{:02}", index + 1),
        }
    }
}

impl fmt::Display for ParticleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticleCategory {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParameterError::UnknownCategory(s.to_owned()))
    }
}

/// Descriptors and size drawn from a recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeDraw {
    pub descriptors: MorphologyDescriptors,
    pub target_diameter: f64,
}

/// Random descriptor source for one particle of a category.
///
/// The gradual category depends on where the particle sits in its batch,
/// so the recipe also carries the particle index and batch size. Other
/// categories ignore both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleRecipe {
    category: ParticleCategory,
    index: usize,
    total: usize,
}

impl ParticleRecipe {
    /// Creates a recipe for a single particle of `category`.
    #[must_use]
    pub fn new(category: ParticleCategory) -> Self {
        Self {
            category,
            index: 0,
            total: 1,
        }
    }

    /// Sets the particle's position within a batch of `total`.
    #[must_use]
    pub fn at(mut self, index: usize, total: usize) -> Self {
        self.index = index;
        self.total = total.max(index + 1);
        self
    }

    /// The recipe's category.
    #[must_use]
    pub fn category(&self) -> ParticleCategory {
        self.category
    }

    /// Transition factor of the gradual category, from 0 (first group) to 1
    /// (last group).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gradual_factor(&self) -> f64 {
        let groups = self.total.div_ceil(GRADUAL_GROUP_SIZE).max(1);
        if groups == 1 {
            return 0.0;
        }
        let group = (self.index / GRADUAL_GROUP_SIZE).min(groups - 1);
        group as f64 / (groups - 1) as f64
    }

    /// Draws descriptors and a diameter.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if a drawn value falls outside its domain,
    /// which the category ranges rule out.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RecipeDraw> {
        let builder = MorphologyDescriptors::builder();
        let builder = match self.category {
            ParticleCategory::Standard => builder
                .elongation(rng.random_range(0.6..=1.0))
                .flatness(rng.random_range(0.6..=1.0))
                .angularity(rng.random_range(0.0..=0.35))
                .roughness(rng.random_range(0.0..=0.15))
                .degree_cutoff(DEFAULT_DEGREE_CUTOFF),
            ParticleCategory::Regular => builder
                .elongation(rng.random_range(0.8..=1.0))
                .flatness(rng.random_range(0.7..=0.95))
                .angularity(rng.random_range(0.0..=0.35))
                .roughness(rng.random_range(0.0..=0.15))
                .degree_cutoff(rng.random_range(8..=12)),
            ParticleCategory::Weird => builder
                .elongation(rng.random_range(0.2..=0.5))
                .flatness(rng.random_range(0.1..=0.4))
                .angularity(rng.random_range(0.0..=0.35))
                .roughness(rng.random_range(0.0..=0.15))
                .degree_cutoff(rng.random_range(30..=50))
                .multiplier(rng.random_range(5.0..=10.0)),
            ParticleCategory::Gradual => {
                let k = self.gradual_factor();
                let centre = gradual_centre(k);
                builder
                    .elongation((centre + rng.random_range(-0.05..=0.05)).min(1.0))
                    .flatness((centre + rng.random_range(-0.05..=0.05)).min(1.0))
                    .angularity(0.25 * k + rng.random_range(0.05..=0.10))
                    .roughness(0.25 * k + rng.random_range(0.0..=0.02))
                    .degree_cutoff(DEFAULT_DEGREE_CUTOFF)
            }
        };

        Ok(RecipeDraw {
            descriptors: builder.build()?,
            target_diameter: rng.random_range(DIAMETER_RANGE),
        })
    }
}

/// Piecewise-linear interpolation through the gradual anchors.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn gradual_centre(k: f64) -> f64 {
    let last = GRADUAL_ANCHORS.len() - 1;
    let pos = k.clamp(0.0, 1.0) * last as f64;
    let i = (pos.floor() as usize).min(last);
    let j = (i + 1).min(last);
    let t = pos - i as f64;
    GRADUAL_ANCHORS[i] * (1.0 - t) + GRADUAL_ANCHORS[j] * t
}
