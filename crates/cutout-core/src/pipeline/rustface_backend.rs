use std::path::Path;

use crate::config::FaceConfig;
use crate::error::{ConfigError, PipelineError};
use crate::types::FaceBox;

use super::face::FaceDetector;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is read once; a fresh detector is built from it on every call
/// because rustface detectors are stateful (`&mut self`).
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_threshold: f64,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file.
    pub fn from_path(path: &Path, config: &FaceConfig) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let model = rustface::read_model(std::io::BufReader::new(file)).map_err(|e| {
            ConfigError::ValidationError(format!(
                "failed to load face model {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("Loaded face model from {}", path.display());
        Ok(Self {
            model,
            min_face_size: config.min_face_size,
            score_threshold: config.score_threshold,
        })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
        let gray = image::load_from_memory(source)
            .map_err(|e| PipelineError::FaceDetection {
                message: e.to_string(),
            })?
            .to_luma8();
        let (width, height) = gray.dimensions();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_threshold);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox::from_rect(
                    bbox.x() as f64,
                    bbox.y() as f64,
                    bbox.width() as f64,
                    bbox.height() as f64,
                )
            })
            .collect())
    }
}
