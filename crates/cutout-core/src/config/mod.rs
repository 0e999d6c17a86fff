//! Configuration management for cutout.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for cutout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Face detection settings
    pub face: FaceConfig,

    /// Output encoding settings
    pub encode: EncodeConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.cutout.cutout/config.toml
    /// - Linux: ~/.config/cutout/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\cutout\config\config.toml
    ///
    /// Falls back to ~/.cutout/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "cutout", "cutout")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".cutout").join("config.toml")
            })
    }

    /// Resolved face model path (with ~ expansion), if one is configured.
    pub fn face_model_path(&self) -> Option<PathBuf> {
        self.face.model_path.as_ref().map(|p| {
            let path_str = p.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.limits.max_file_size_mb, 50);
        assert_eq!(config.encode.background, [250, 250, 250]);
        assert_eq!(config.face.detector, DetectorKind::None);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[encode]"));
        assert!(toml.contains("[face]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[encode]\ndefault_quality = 80\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.encode.default_quality, 80);
        assert_eq!(config.encode.background, [250, 250, 250]);
        assert_eq!(config.processing.parallel_workers, 4);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nparallel_workers = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_face_model_path_expands_tilde() {
        let mut config = Config::default();
        assert!(config.face_model_path().is_none());

        config.face.model_path = Some(PathBuf::from("/models/seeta.bin"));
        assert_eq!(
            config.face_model_path(),
            Some(PathBuf::from("/models/seeta.bin"))
        );
    }
}
