//! Focal-point location: image center by default, the first detected face
//! when face gravity is requested and a face is found.

use crate::options::Gravity;
use crate::types::{FaceBox, FocalPoint};

use super::face::FaceDetector;

/// Horizontal and vertical padding around a detected face, as a fraction of
/// the face box edge.
pub const FACE_PADDING: f64 = 0.35;

/// Upward shift of the framed region, as a fraction of the face height.
/// Detectors box the eyes-to-chin area; this moves the frame toward the
/// forehead and hair.
pub const EYE_LINE_SHIFT: f64 = 0.20;

/// Axis-aligned region in source pixels: (x0, y0, x1, y1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Pad a face box and clamp it to the image bounds.
pub fn expand_face_box(face: &FaceBox, image_width: u32, image_height: u32) -> Region {
    let x_pad = (face.right - face.left) * FACE_PADDING;
    let y_pad = (face.bottom - face.top) * FACE_PADDING;
    let eyes_pad = (face.bottom - face.top) * EYE_LINE_SHIFT;

    Region {
        x0: (face.left - x_pad).max(0.0),
        y0: (face.top - y_pad - eyes_pad).max(0.0),
        x1: (face.right + x_pad).min(image_width as f64),
        y1: (face.bottom + y_pad - eyes_pad).min(image_height as f64),
    }
}

/// Focal point centered on a region, with half its extent on each axis.
pub fn focal_from_region(region: &Region) -> FocalPoint {
    let half_w = ((region.x1 - region.x0) / 2.0).floor();
    let half_h = ((region.y1 - region.y0) / 2.0).floor();
    FocalPoint {
        cx: region.x0 + half_w,
        cy: region.y0 + half_h,
        delta_x: half_w,
        delta_y: half_h,
    }
}

/// Determine the focal point for a source of the given size.
///
/// Face gravity never fails: detector errors and empty results both keep
/// the centered default.
pub fn locate(
    gravity: Gravity,
    source: &[u8],
    dimensions: (u32, u32),
    detector: &dyn FaceDetector,
) -> FocalPoint {
    let (width, height) = dimensions;
    let centered = FocalPoint::centered(width, height);
    if gravity != Gravity::Face {
        return centered;
    }

    let faces = match detector.detect(source) {
        Ok(faces) => faces,
        Err(e) => {
            tracing::warn!("Face detection failed, using center gravity: {}", e);
            return centered;
        }
    };

    match faces.first() {
        Some(face) => {
            let region = expand_face_box(face, width, height);
            tracing::debug!(
                "Found {} face(s); framing first at {:?}",
                faces.len(),
                region
            );
            focal_from_region(&region)
        }
        None => {
            tracing::debug!("No faces found, using center gravity");
            centered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct Fixed(Vec<FaceBox>);

    impl FaceDetector for Fixed {
        fn detect(&self, _source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl FaceDetector for Failing {
        fn detect(&self, _source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
            Err(PipelineError::FaceDetection {
                message: "model exploded".into(),
            })
        }
    }

    #[test]
    fn test_expand_face_box_pads_and_shifts_up() {
        // 100x100 face at (200, 200)
        let face = FaceBox::new(200.0, 300.0, 300.0, 200.0);
        let region = expand_face_box(&face, 1000, 1000);
        assert_eq!(region.x0, 165.0);
        assert_eq!(region.x1, 335.0);
        // y0 = 200 - 35 - 20, y1 = 300 + 35 - 20
        assert_eq!(region.y0, 145.0);
        assert_eq!(region.y1, 315.0);
    }

    #[test]
    fn test_expand_face_box_clamps_to_image() {
        let face = FaceBox::new(5.0, 95.0, 60.0, 10.0);
        let region = expand_face_box(&face, 100, 60);
        assert_eq!(region.x0, 0.0);
        assert_eq!(region.y0, 0.0);
        assert_eq!(region.x1, 100.0);
        assert!(region.y1 <= 60.0);
    }

    #[test]
    fn test_focal_from_region() {
        let focal = focal_from_region(&Region {
            x0: 165.0,
            y0: 145.0,
            x1: 335.0,
            y1: 315.0,
        });
        assert_eq!(focal.cx, 250.0);
        assert_eq!(focal.cy, 230.0);
        assert_eq!(focal.delta_x, 85.0);
        assert_eq!(focal.delta_y, 85.0);
    }

    #[test]
    fn test_center_gravity_ignores_detector() {
        let detector = Fixed(vec![FaceBox::new(0.0, 10.0, 10.0, 0.0)]);
        let focal = locate(Gravity::Center, &[], (800, 600), &detector);
        assert_eq!(focal, FocalPoint::centered(800, 600));
    }

    #[test]
    fn test_face_gravity_uses_first_face() {
        let detector = Fixed(vec![
            FaceBox::new(200.0, 300.0, 300.0, 200.0),
            FaceBox::new(0.0, 50.0, 50.0, 0.0),
        ]);
        let focal = locate(Gravity::Face, &[], (1000, 1000), &detector);
        assert_eq!(focal.cx, 250.0);
        assert_eq!(focal.cy, 230.0);
    }

    #[test]
    fn test_face_gravity_without_faces_is_centered() {
        let focal = locate(Gravity::Face, &[], (800, 600), &Fixed(vec![]));
        assert_eq!(focal, FocalPoint::centered(800, 600));
    }

    #[test]
    fn test_face_gravity_absorbs_detector_errors() {
        let focal = locate(Gravity::Face, &[], (800, 600), &Failing);
        assert_eq!(focal, FocalPoint::centered(800, 600));
    }
}
