use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the particle generator.
///
/// Each variant identifies the pipeline stage that failed; the wrapped
/// error carries the underlying cause.
#[derive(Debug, Error)]
pub enum ShpsgError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("mesh build failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("coefficient synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("surface evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A caller-supplied value outside its documented domain.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter {parameter} must be finite, got {value}")]
    NotFinite { parameter: &'static str, value: f64 },

    #[error("unknown particle category '{0}' (expected standard, regular, weird or gradual)")]
    UnknownCategory(String),
}

/// Errors related to building the sampling mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("angular coordinate count {angles} does not match vertex count {vertices}")]
    CoordinateCountMismatch { angles: usize, vertices: usize },
}

/// Errors related to coefficient synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("coefficient tensor has {rows} rows, expected (L+1)^2 = {expected}")]
    ShapeMismatch { rows: usize, expected: usize },
}

/// Errors related to evaluating a coefficient tensor on a mesh.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("evaluated {positions} positions for a mesh with {vertices} vertices")]
    VertexCountMismatch { positions: usize, vertices: usize },
}

/// Errors related to reading or writing surface files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("surface has {0} triangles, binary STL holds at most u32::MAX")]
    TooManyTriangles(usize),

    #[error("malformed STL {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: StlDecodeError,
    },
}

/// Structural problems in binary STL bytes.
#[derive(Debug, Error)]
pub enum StlDecodeError {
    #[error("{0} bytes is shorter than the 84-byte STL preamble")]
    TooShort(usize),

    #[error("header declares {triangles} triangles ({expected} bytes), data has {actual} bytes")]
    LengthMismatch {
        triangles: usize,
        expected: usize,
        actual: usize,
    },

    #[error("truncated triangle record: {0}")]
    Truncated(#[from] std::io::Error),
}

/// Errors related to loading a particle configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for results using [`ShpsgError`].
pub type Result<T> = std::result::Result<T, ShpsgError>;
