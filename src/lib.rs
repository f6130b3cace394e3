pub mod config;
pub mod error;
pub mod export;
pub mod harmonics;
pub mod math;
pub mod mesh;
pub mod particle;
pub mod surface;

pub use config::ParticleConfig;
pub use error::{Result, ShpsgError};
pub use harmonics::{CoefficientTensor, MorphologyDescriptors};
pub use mesh::SamplingMesh;
pub use particle::{GenerateParticle, ParticleCategory, ParticleRecipe, ParticleRecord};
pub use surface::ParticleSurface;
