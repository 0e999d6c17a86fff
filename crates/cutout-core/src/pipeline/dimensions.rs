//! Target size resolution.
//!
//! Each axis is evaluated through the same fallback chain: integer pixels,
//! then a fraction of the matching source edge, then absent. Absent axes are
//! rebuilt from the source aspect ratio, or the source size is used as-is.

use crate::types::ResolvedSize;

/// Parse one axis request against the matching source edge.
///
/// Returns `None` for anything that does not yield at least one pixel.
pub fn parse_axis(raw: Option<&str>, source_edge: u32) -> Option<u32> {
    let raw = raw?.trim();
    parse_pixels(raw)
        .or_else(|| parse_fraction(raw, source_edge))
        .filter(|&px| px >= 1)
}

fn parse_pixels(raw: &str) -> Option<u32> {
    let px = raw.parse::<i64>().ok()?;
    // A well-formed integer never falls through to the fraction parser
    Some(px.clamp(0, u32::MAX as i64) as u32)
}

fn parse_fraction(raw: &str, source_edge: u32) -> Option<u32> {
    let fraction = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    let px = (fraction * source_edge as f64).floor();
    (px >= 1.0).then(|| px.min(u32::MAX as f64) as u32)
}

/// Resolve the final target size for a source of `source` dimensions.
pub fn resolve(width: Option<&str>, height: Option<&str>, source: (u32, u32)) -> ResolvedSize {
    let (source_w, source_h) = (source.0.max(1), source.1.max(1));

    let resolved = match (parse_axis(width, source_w), parse_axis(height, source_h)) {
        (Some(w), Some(h)) => ResolvedSize::new(w, h),
        (Some(w), None) => ResolvedSize::new(w, scale_axis(w, source_h, source_w)),
        (None, Some(h)) => ResolvedSize::new(scale_axis(h, source_w, source_h), h),
        (None, None) => ResolvedSize::new(source_w, source_h),
    };

    tracing::trace!(
        "Resolved size {:?}x{:?} against {}x{} -> {}x{}",
        width,
        height,
        source_w,
        source_h,
        resolved.width,
        resolved.height
    );
    resolved
}

/// `present * other / present_source`, floored, at least one pixel.
fn scale_axis(present: u32, source_other: u32, source_present: u32) -> u32 {
    let scaled = present as u64 * source_other as u64 / source_present as u64;
    scaled.clamp(1, u32::MAX as u64) as u32
}
