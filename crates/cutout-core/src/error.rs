//! Error types for the cutout transformation pipeline.
//!
//! Only a handful of conditions are fatal for a request: an undecodable
//! source, a source format the encoder cannot handle, and a border colour
//! name that does not resolve. Sloppy option syntax never produces an error;
//! it degrades to defaults inside the pipeline.

use thiserror::Error;

/// Top-level error type for cutout operations.
#[derive(Error, Debug)]
pub enum CutoutError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes could not be decoded
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The source codec has no output path in the encoder
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Border colour name is not in the named-colour table
    #[error("Invalid color name: {name}")]
    InvalidColorName { name: String },

    /// Face detector backend failed (absorbed by the focal-point locator)
    #[error("Face detection failed: {message}")]
    FaceDetection { message: String },

    /// Output serialization failed
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Source exceeds the configured byte limit
    #[error("Source too large: {size_mb}MB > {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Decoded dimensions exceed the configured limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },
}

/// Convenience type alias for cutout results.
pub type Result<T> = std::result::Result<T, CutoutError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
