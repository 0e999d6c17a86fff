//! Cutout Core - Embeddable image transformation engine.
//!
//! Cutout takes raw image bytes plus a compact option string and produces a
//! new encoded image: resized, cropped around a focal point (optionally a
//! detected face), optionally masked to a circle with a ring border.
//!
//! # Architecture
//!
//! Every transform is a pure function of its inputs:
//!
//! ```text
//! bytes + "w_200,h_200,c_thumb,g_face,r_max" → Decode → Resolve size
//!       → Focal point → Crop → Mask/Border → Encode → JPEG bytes
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cutout_core::{Config, Cutout};
//!
//! fn main() -> cutout_core::Result<()> {
//!     let cutout = Cutout::new(Config::load()?)?;
//!     let source = std::fs::read("portrait.jpg")?;
//!     let out = cutout.transform_str(&source, "w_200,h_200,c_thumb,g_face,r_max")?;
//!     std::fs::write("avatar.jpg", &out.bytes)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, CutoutError, PipelineError, PipelineResult, Result};
pub use options::{BorderSpec, CropMode, Gravity, Quality, RadiusMode, TransformOptions};
pub use output::{OutputFormat, Outcome, ReportWriter, TransformRecord};
pub use pipeline::{Codec, FaceDetector, Transformer};
pub use types::{EncodedImage, FaceBox, FocalPoint, OutputCodec, ResolvedSize};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main entry point: a configuration plus a ready transformer.
pub struct Cutout {
    config: Config,
    transformer: Transformer,
}

impl Cutout {
    /// Build from configuration. Loads the face model if one is configured.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Cutout v{}", VERSION);
        let transformer = Transformer::new(&config)?;
        Ok(Self {
            config,
            transformer,
        })
    }

    /// Build from the config file at the default location.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Config::load()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Transform with already parsed options.
    pub fn transform(
        &self,
        source: &[u8],
        options: &TransformOptions,
    ) -> PipelineResult<EncodedImage> {
        self.transformer.transform(source, options)
    }

    /// Transform with a raw option string such as `w_200,h_100,c_fill`.
    pub fn transform_str(&self, source: &[u8], options: &str) -> PipelineResult<EncodedImage> {
        self.transform(source, &TransformOptions::parse(options))
    }
}
