//! Source decoding with content-based format detection.
//!
//! A fresh `ImageReader` is built for every call, so concurrent transforms
//! never share decoder state.

use image::ImageReader;
use std::io::Cursor;

use crate::error::PipelineError;
use crate::types::{RasterImage, SourceFormat};

/// Decode source bytes into a raster, tagging it with the detected format.
pub fn decode_bytes(bytes: &[u8]) -> Result<RasterImage, PipelineError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            message: format!("Cannot detect image format: {}", e),
        })?;

    let format = reader.format().ok_or_else(|| PipelineError::Decode {
        message: "Cannot detect image format".to_string(),
    })?;

    let image = reader.decode().map_err(|e| PipelineError::Decode {
        message: e.to_string(),
    })?;

    Ok(RasterImage::new(image, SourceFormat::from_image_format(format)))
}
