//! Output encoding.
//!
//! Every supported source is written as JPEG. Alpha is handled per source
//! codec: JPEG sources drop it, PNG sources are flattened onto the
//! configured background colour first.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};

use crate::error::PipelineError;
use crate::options::Quality;
use crate::types::{OutputCodec, RasterImage, SourceFormat};

/// Turns a prepared RGB raster into bytes.
pub trait Codec: Send + Sync {
    fn encode(
        &self,
        image: &DynamicImage,
        codec: OutputCodec,
        quality: Quality,
    ) -> Result<Vec<u8>, PipelineError>;
}

/// Baseline JPEG through the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegCodec;

impl Codec for JpegCodec {
    fn encode(
        &self,
        image: &DynamicImage,
        codec: OutputCodec,
        quality: Quality,
    ) -> Result<Vec<u8>, PipelineError> {
        match codec {
            OutputCodec::Jpeg => {
                let mut buf = Cursor::new(Vec::new());
                // The encoder rejects 0; 1 is the lowest it accepts.
                let q = quality.value().clamp(1, 100);
                image
                    .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))
                    .map_err(|e| PipelineError::Encode {
                        message: e.to_string(),
                    })?;
                Ok(buf.into_inner())
            }
        }
    }
}

/// Pick the output codec for a source format and remove alpha accordingly.
pub fn prepare_for_output(
    raster: RasterImage,
    background: [u8; 3],
) -> Result<(DynamicImage, OutputCodec), PipelineError> {
    match &raster.format {
        SourceFormat::Jpeg => Ok((
            DynamicImage::ImageRgb8(raster.image.to_rgb8()),
            OutputCodec::Jpeg,
        )),
        SourceFormat::Png => Ok((
            DynamicImage::ImageRgb8(flatten(&raster.image, background)),
            OutputCodec::Jpeg,
        )),
        SourceFormat::Other(format) => Err(PipelineError::UnsupportedFormat {
            format: format.clone(),
        }),
    }
}

/// Composite onto an opaque background using the alpha channel as mask.
pub fn flatten(image: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(
            x,
            y,
            Rgb([
                blend(px[0], background[0]),
                blend(px[1], background[1]),
                blend(px[2], background[2]),
            ]),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    const BACKGROUND: [u8; 3] = [250, 250, 250];

    fn rgba_raster(format: SourceFormat) -> RasterImage {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        img.put_pixel(4, 4, Rgba([200, 0, 0, 255]));
        RasterImage::new(DynamicImage::ImageRgba8(img), format)
    }

    #[test]
    fn test_png_source_is_flattened_onto_background() {
        let (image, codec) = prepare_for_output(rgba_raster(SourceFormat::Png), BACKGROUND).unwrap();
        assert_eq!(codec, OutputCodec::Jpeg);
        assert!(!image.color().has_alpha());
        assert_eq!(image.get_pixel(0, 0), Rgba([250, 250, 250, 255]));
        assert_eq!(image.get_pixel(4, 4), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn test_jpeg_source_drops_alpha() {
        let (image, _) = prepare_for_output(rgba_raster(SourceFormat::Jpeg), BACKGROUND).unwrap();
        assert!(!image.color().has_alpha());
        // Transparent black stays black rather than taking the background
        assert_eq!(image.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_other_source_is_unsupported() {
        let err = prepare_for_output(rgba_raster(SourceFormat::Other("gif".into())), BACKGROUND)
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { ref format } if format == "gif"));
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let flat = flatten(&img, [255, 255, 255]);
        let v = flat.get_pixel(0, 0)[0];
        assert!((126..=128).contains(&v));
    }

    #[test]
    fn test_jpeg_codec_writes_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([1, 2, 3])));
        let bytes = JpegCodec
            .encode(&img, OutputCodec::Jpeg, Quality::new(0))
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let mut img = RgbImage::new(64, 64);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8]);
        }
        let img = DynamicImage::ImageRgb8(img);
        let high = JpegCodec.encode(&img, OutputCodec::Jpeg, Quality::new(100)).unwrap();
        let low = JpegCodec.encode(&img, OutputCodec::Jpeg, Quality::new(10)).unwrap();
        assert!(low.len() < high.len());
    }
}
