//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, DetectorKind};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.transform_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.transform_timeout_ms must be > 0".into(),
            ));
        }
        if self.encode.default_quality > 100 {
            return Err(ConfigError::ValidationError(
                "encode.default_quality must be between 0 and 100".into(),
            ));
        }
        if self.face.detector == DetectorKind::Rustface && self.face.model_path.is_none() {
            return Err(ConfigError::ValidationError(
                "face.model_path is required when face.detector = \"rustface\"".into(),
            ));
        }
        Ok(())
    }
}
