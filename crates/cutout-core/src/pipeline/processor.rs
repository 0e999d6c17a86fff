//! Pipeline orchestration: wires the transformation stages together.
//!
//! ```text
//! bytes → validate → decode → resolve size → locate focal point
//!       → crop strategy → mask/border → flatten → encode
//! ```

use std::time::Instant;

use crate::config::{Config, EncodeConfig};
use crate::error::{ConfigError, PipelineError};
use crate::options::{CropMode, Gravity, Quality, RadiusMode, TransformOptions};
use crate::types::{EncodedImage, FocalPoint, RasterImage};

use super::decode::decode_bytes;
use super::dimensions;
use super::encode::{prepare_for_output, Codec, JpegCodec};
use super::face::{detector_from_config, FaceDetector};
use super::focal;
use super::mask;
use super::strategy;
use super::validate::Validator;

/// Runs one option set against one source image.
///
/// A `Transformer` holds no per-request state, so a single instance can be
/// shared across threads and reused for any number of requests.
pub struct Transformer {
    validator: Validator,
    detector: Box<dyn FaceDetector>,
    codec: Box<dyn Codec>,
    encode: EncodeConfig,
}

impl Transformer {
    /// Build a transformer with the detector selected in the configuration.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: Validator::new(config.limits.clone()),
            detector: detector_from_config(config)?,
            codec: Box::new(JpegCodec),
            encode: config.encode.clone(),
        })
    }

    /// Replace the face detector.
    pub fn with_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Replace the output codec.
    pub fn with_codec(mut self, codec: Box<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Transform `source` according to `options`.
    ///
    /// Fails only when the source cannot be decoded, exceeds the configured
    /// limits, has no output path, or names an unknown border colour.
    pub fn transform(
        &self,
        source: &[u8],
        options: &TransformOptions,
    ) -> Result<EncodedImage, PipelineError> {
        let start = Instant::now();

        self.validator.validate(source)?;

        let decode_start = Instant::now();
        let raster = decode_bytes(source)?;
        let (src_w, src_h) = raster.dimensions();
        self.validator.check_dimensions(src_w, src_h)?;
        tracing::trace!("  Decode: {:?} ({}x{})", decode_start.elapsed(), src_w, src_h);

        let size = dimensions::resolve(
            options.width.as_deref(),
            options.height.as_deref(),
            (src_w, src_h),
        );
        self.validator.check_dimensions(size.width, size.height)?;

        let focal_start = Instant::now();
        let focal = self.focal_point(source, &raster, options);
        tracing::trace!("  Focal point: {:?}", focal_start.elapsed());

        let crop_start = Instant::now();
        let raster = strategy::apply(options.crop, raster, size, &focal, &self.validator)?;
        tracing::trace!("  Crop ({:?}): {:?}", options.crop, crop_start.elapsed());

        let raster = match options.radius {
            RadiusMode::Max => {
                let mask_start = Instant::now();
                let masked = mask::composite(raster, options.border.as_ref(), &self.validator)?;
                tracing::trace!("  Mask: {:?}", mask_start.elapsed());
                masked
            }
            RadiusMode::None => raster,
        };

        let encode_start = Instant::now();
        let (image, codec) = prepare_for_output(raster, self.encode.background)?;
        let quality = options
            .quality
            .unwrap_or_else(|| Quality::new(self.encode.default_quality as i64));
        let bytes = self.codec.encode(&image, codec, quality)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        tracing::debug!(
            "Transformed {}x{} -> {}x{} ({} bytes) in {:?}",
            src_w,
            src_h,
            image.width(),
            image.height(),
            bytes.len(),
            start.elapsed()
        );

        Ok(EncodedImage {
            bytes,
            codec,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Only thumb crops read the focal point; face detection is skipped
    /// for every other mode.
    fn focal_point(
        &self,
        source: &[u8],
        raster: &RasterImage,
        options: &TransformOptions,
    ) -> FocalPoint {
        let gravity = match options.crop {
            CropMode::Thumb => options.gravity,
            _ => Gravity::Center,
        };
        focal::locate(gravity, source, raster.dimensions(), self.detector.as_ref())
    }
}
