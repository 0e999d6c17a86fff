//! Circular (elliptical) mask and optional ring border.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_ellipse_mut;

use crate::error::PipelineError;
use crate::options::BorderSpec;
use crate::types::RasterImage;

use super::color::name_to_rgb;
use super::validate::Validator;

/// Whether pixel `(x, y)` lies inside the ellipse inscribed in a
/// `width` x `height` box.
pub fn in_ellipse(x: u32, y: u32, width: u32, height: u32) -> bool {
    let rx = width as f64 / 2.0;
    let ry = height as f64 / 2.0;
    let dx = (x as f64 - rx) / rx;
    let dy = (y as f64 - ry) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Mask coverage at `(x, y)`: 255 inside the ellipse, 0 outside.
fn coverage(x: u32, y: u32, width: u32, height: u32) -> u8 {
    if in_ellipse(x, y, width, height) {
        255
    } else {
        0
    }
}

/// Multiply each pixel's alpha by the elliptical mask.
pub fn apply_mask(image: &DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    for (x, y, pixel) in rgba.enumerate_pixels_mut() {
        let m = coverage(x, y, width, height) as u16;
        pixel[3] = (pixel[3] as u16 * m / 255) as u8;
    }
    rgba
}

/// Canvas size for a ring of `width` pixels around an `inner` image, or
/// `None` when it does not fit in `u32`.
pub fn ring_canvas_size(inner: (u32, u32), width: u32) -> Option<(u32, u32)> {
    let grow = width.checked_mul(2)?;
    Some((inner.0.checked_add(grow)?, inner.1.checked_add(grow)?))
}

/// Draw a ring of `width` pixels in `color` around an already masked image.
///
/// The canvas grows by `2 * width` on each axis. The ring is the opaque
/// outer ellipse showing through wherever the inner ellipse does not cover.
/// Returns `None` when the canvas size overflows.
pub fn draw_ring(masked: &RgbaImage, width: u32, color: [u8; 3]) -> Option<RgbaImage> {
    let (inner_w, inner_h) = masked.dimensions();
    let (outer_w, outer_h) = ring_canvas_size((inner_w, inner_h), width)?;
    let ring = Rgba([color[0], color[1], color[2], 255]);

    let rx = i32::try_from(outer_w / 2).ok()?;
    let ry = i32::try_from(outer_h / 2).ok()?;
    let mut canvas = RgbaImage::new(outer_w, outer_h);
    draw_filled_ellipse_mut(&mut canvas, (rx, ry), rx, ry, ring);

    for (x, y, pixel) in masked.enumerate_pixels() {
        if in_ellipse(x, y, inner_w, inner_h) {
            canvas.put_pixel(x + width, y + width, *pixel);
        }
    }
    Some(canvas)
}

/// Apply the circular mask, then the border ring when one is requested.
///
/// The border colour is resolved and the bordered canvas checked against
/// the limits before any pixel work, so a bad border fails without
/// partial output.
pub fn composite(
    raster: RasterImage,
    border: Option<&BorderSpec>,
    validator: &Validator,
) -> Result<RasterImage, PipelineError> {
    let ring = match border {
        Some(b) if b.width > 0 => Some((b.width, name_to_rgb(&b.color)?)),
        Some(b) => {
            // Still validate the colour; a zero-width ring draws nothing.
            name_to_rgb(&b.color)?;
            None
        }
        None => None,
    };

    if let Some((width, _)) = ring {
        let (outer_w, outer_h) = ring_canvas_size(raster.dimensions(), width)
            .ok_or_else(|| overflowed(validator))?;
        validator.check_dimensions(outer_w, outer_h)?;
    }

    let masked = apply_mask(&raster.image);
    let output = match ring {
        Some((width, color)) => {
            tracing::trace!("Drawing {}px border ring", width);
            draw_ring(&masked, width, color).ok_or_else(|| overflowed(validator))?
        }
        None => masked,
    };
    Ok(raster.with_image(DynamicImage::ImageRgba8(output)))
}

fn overflowed(validator: &Validator) -> PipelineError {
    PipelineError::ImageTooLarge {
        width: u32::MAX,
        height: u32::MAX,
        max_dim: validator.max_dimension(),
    }
}
