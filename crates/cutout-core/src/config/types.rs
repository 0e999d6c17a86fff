//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of transforms allowed to run at once
    pub parallel_workers: usize,

    /// File extensions picked up when transforming a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded dimension (width or height)
    pub max_image_dimension: u32,

    /// Caller-side bound on a whole transform, in milliseconds.
    /// The pipeline itself never times out; the CLI enforces this.
    pub transform_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 12000,
            transform_timeout_ms: 30000,
        }
    }
}

/// Which face detector backs `g_face` gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Never finds a face; face gravity behaves like center gravity
    #[default]
    None,
    /// SeetaFace frontal detector (requires the `rustface` feature)
    Rustface,
}

/// Face detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Detector backend
    pub detector: DetectorKind,

    /// Path to the SeetaFace model file (supports `~`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// Smallest face edge the detector looks for, in pixels
    pub min_face_size: u32,

    /// Detector score threshold
    pub score_threshold: f64,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            detector: DetectorKind::None,
            model_path: None,
            min_face_size: 20,
            score_threshold: 2.0,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Opaque colour transparent PNG pixels are flattened onto
    pub background: [u8; 3],

    /// Quality used when the options record carries no `q`
    pub default_quality: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            background: [250, 250, 250],
            default_quality: 100,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
