//! Core data types passed between pipeline stages.

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::Serialize;

/// Codec the source bytes were decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Lossy RGB
    Jpeg,
    /// Lossless, possibly with alpha
    Png,
    /// Decodable, but with no output path in the encoder
    Other(String),
}

impl SourceFormat {
    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            ImageFormat::Png => SourceFormat::Png,
            other => SourceFormat::Other(
                other
                    .extensions_str()
                    .first()
                    .copied()
                    .unwrap_or("unknown")
                    .to_string(),
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
            SourceFormat::Other(name) => name,
        }
    }
}

/// A decoded raster moving through the pipeline.
///
/// Each stage consumes the value and returns a new one; there is never more
/// than one owner of the pixel buffer.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
}

impl RasterImage {
    pub fn new(image: DynamicImage, format: SourceFormat) -> Self {
        Self { image, format }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Whether the pixel buffer carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// Replace the pixels, keeping the source format tag.
    pub fn with_image(self, image: DynamicImage) -> Self {
        Self {
            image,
            format: self.format,
        }
    }
}

/// Final target dimensions after resolution; both axes always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSize {
    pub width: u32,
    pub height: u32,
}

impl ResolvedSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Target aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Region of interest a crop strategy centers on.
///
/// `delta_x` / `delta_y` are half-extents around `(cx, cy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocalPoint {
    pub cx: f64,
    pub cy: f64,
    pub delta_x: f64,
    pub delta_y: f64,
}

impl FocalPoint {
    /// Image center with a square half-extent of `min(w, h) / 2`.
    pub fn centered(width: u32, height: u32) -> Self {
        let half = (width / 2).min(height / 2) as f64;
        Self {
            cx: (width / 2) as f64,
            cy: (height / 2) as f64,
            delta_x: half,
            delta_y: half,
        }
    }
}

/// Face bounding box as reported by a detector: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceBox {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl FaceBox {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Build from a top-left corner plus size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(y, x + width, y + height, x)
    }
}

/// Output codec of an encoded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCodec {
    Jpeg,
}

impl OutputCodec {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputCodec::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputCodec::Jpeg => "jpg",
        }
    }
}

/// Final pipeline output: encoded bytes plus what they are.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub codec: OutputCodec,
    pub width: u32,
    pub height: u32,
}
