//! Crop/resize strategies.
//!
//! | mode | behaviour | exact target size |
//! |---|---|---|
//! | `none` | stretch-resize, aspect ratio ignored | yes |
//! | `thumb` | crop around the focal point, scale to cover | no (≥ target) |
//! | `fill` | contain: scale to fit inside, center on transparent canvas | yes |
//! | `pad` | cover: scale to cover, center on canvas, overflow clipped | yes |

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::error::PipelineError;
use crate::options::CropMode;
use crate::types::{FocalPoint, RasterImage, ResolvedSize};

use super::validate::Validator;

/// Resampling filter used for every scale step.
const FILTER: FilterType = FilterType::Lanczos3;

/// Slack added before flooring scaled edges so `edge * (target / edge)`
/// does not land one pixel short through float rounding.
const SCALE_EPSILON: f64 = 1e-9;

/// Bring the raster to the target size using the selected mode.
///
/// `size` must already be within the validator's limits. Thumb crops are
/// checked again because their crop box and output can exceed the target.
pub fn apply(
    mode: CropMode,
    raster: RasterImage,
    size: ResolvedSize,
    focal: &FocalPoint,
    validator: &Validator,
) -> Result<RasterImage, PipelineError> {
    Ok(match mode {
        CropMode::None => stretch(raster, size),
        CropMode::Thumb => thumb(raster, size, focal, validator)?,
        CropMode::Fill => fill(raster, size),
        CropMode::Pad => pad(raster, size),
    })
}

/// Resize to exactly `size`, ignoring aspect ratio.
pub fn stretch(raster: RasterImage, size: ResolvedSize) -> RasterImage {
    let resized = raster.image.resize_exact(size.width, size.height, FILTER);
    raster.with_image(resized)
}

/// Crop a region around the focal point stretched to the target aspect
/// ratio, then scale uniformly until both target edges are covered.
///
/// Both the crop box and the scaled output are checked against the limits
/// before any pixels are allocated.
pub fn thumb(
    raster: RasterImage,
    size: ResolvedSize,
    focal: &FocalPoint,
    validator: &Validator,
) -> Result<RasterImage, PipelineError> {
    let ar = size.aspect_ratio();
    let x0 = (focal.cx - focal.delta_x * ar).round() as i64;
    let y0 = (focal.cy - focal.delta_y / ar).round() as i64;
    let x1 = (focal.cx + focal.delta_x * ar).round() as i64;
    let y1 = (focal.cy + focal.delta_y / ar).round() as i64;

    let crop_w = span(x0, x1);
    let crop_h = span(y0, y1);
    validator.check_dimensions(crop_w, crop_h)?;

    let factor = f64::max(
        size.width as f64 / crop_w as f64,
        size.height as f64 / crop_h as f64,
    );
    let out_w = scale_edge(crop_w, factor);
    let out_h = scale_edge(crop_h, factor);
    tracing::trace!(
        "thumb: crop {}x{} at ({}, {}), scale {:.4} -> {}x{}",
        crop_w,
        crop_h,
        x0,
        y0,
        factor,
        out_w,
        out_h
    );
    validator.check_dimensions(out_w, out_h)?;

    let cropped = crop_region(&raster.image, x0, y0, crop_w, crop_h);
    Ok(raster.with_image(cropped.resize_exact(out_w, out_h, FILTER)))
}

/// Contain: scale so the whole source fits inside the target, then center
/// it on a transparent canvas of exactly the target size.
pub fn fill(raster: RasterImage, size: ResolvedSize) -> RasterImage {
    let (src_w, src_h) = raster.dimensions();
    let factor = f64::max(
        src_w as f64 / size.width as f64,
        src_h as f64 / size.height as f64,
    );
    let scaled_w = scale_edge(src_w, 1.0 / factor).min(size.width);
    let scaled_h = scale_edge(src_h, 1.0 / factor).min(size.height);
    center_on_canvas(raster, size, scaled_w, scaled_h)
}

/// Cover: scale so the source covers the whole target, then center it on a
/// transparent canvas of exactly the target size, clipping the overflow.
pub fn pad(raster: RasterImage, size: ResolvedSize) -> RasterImage {
    let (src_w, src_h) = raster.dimensions();
    let factor = f64::min(
        src_w as f64 / size.width as f64,
        src_h as f64 / size.height as f64,
    );
    let scaled_w = scale_edge(src_w, 1.0 / factor).max(size.width);
    let scaled_h = scale_edge(src_h, 1.0 / factor).max(size.height);
    center_on_canvas(raster, size, scaled_w, scaled_h)
}

fn center_on_canvas(
    raster: RasterImage,
    size: ResolvedSize,
    scaled_w: u32,
    scaled_h: u32,
) -> RasterImage {
    let scaled = raster.image.resize_exact(scaled_w, scaled_h, FILTER).to_rgba8();

    let mut canvas = RgbaImage::from_pixel(size.width, size.height, image::Rgba([255, 255, 255, 0]));
    let offset_x = (size.width as i64 - scaled_w as i64).div_euclid(2);
    let offset_y = (size.height as i64 - scaled_h as i64).div_euclid(2);
    imageops::replace(&mut canvas, &scaled, offset_x, offset_y);

    raster.with_image(DynamicImage::ImageRgba8(canvas))
}

/// Crop a rectangle that may extend past the image; uncovered pixels are
/// transparent black.
pub fn crop_region(image: &DynamicImage, x: i64, y: i64, width: u32, height: u32) -> DynamicImage {
    let inside = x >= 0
        && y >= 0
        && x + width as i64 <= image.width() as i64
        && y + height as i64 <= image.height() as i64;
    if inside {
        return image.crop_imm(x as u32, y as u32, width, height);
    }

    let mut canvas = RgbaImage::new(width, height);
    imageops::replace(&mut canvas, &image.to_rgba8(), -x, -y);
    DynamicImage::ImageRgba8(canvas)
}

/// Length of `[start, end)`, at least 1 and saturating at `u32::MAX`.
fn span(start: i64, end: i64) -> u32 {
    u32::try_from(end.saturating_sub(start).max(1)).unwrap_or(u32::MAX)
}

fn scale_edge(edge: u32, factor: f64) -> u32 {
    let scaled = (edge as f64 * factor + SCALE_EPSILON).floor();
    scaled.clamp(1.0, u32::MAX as f64) as u32
}
