//! Pluggable face detection for `g_face` gravity.

use crate::config::{Config, DetectorKind};
use crate::error::{ConfigError, PipelineError};
use crate::types::FaceBox;

/// Face detection capability.
///
/// Receives the raw source bytes and reports zero or more boxes in source
/// pixel coordinates. Implementations must be safe to call from several
/// threads at once.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, source: &[u8]) -> Result<Vec<FaceBox>, PipelineError>;
}

/// Detector that never finds a face.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
        Ok(Vec::new())
    }
}

/// Build the detector selected in the configuration.
pub fn detector_from_config(config: &Config) -> Result<Box<dyn FaceDetector>, ConfigError> {
    match config.face.detector {
        DetectorKind::None => Ok(Box::new(NoFaceDetector)),
        DetectorKind::Rustface => rustface_detector(config),
    }
}

#[cfg(feature = "rustface")]
fn rustface_detector(config: &Config) -> Result<Box<dyn FaceDetector>, ConfigError> {
    let path = config.face_model_path().ok_or_else(|| {
        ConfigError::ValidationError("face.model_path is required for rustface".into())
    })?;
    let detector = super::rustface_backend::RustfaceDetector::from_path(&path, &config.face)?;
    Ok(Box::new(detector))
}

#[cfg(not(feature = "rustface"))]
fn rustface_detector(_config: &Config) -> Result<Box<dyn FaceDetector>, ConfigError> {
    Err(ConfigError::ValidationError(
        "face.detector = \"rustface\" needs a build with the `rustface` feature".into(),
    ))
}
