//! End-to-end transform behaviour against in-memory sources.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use cutout_core::error::PipelineError;
use cutout_core::pipeline::JpegCodec;
use cutout_core::{
    Codec, Config, FaceBox, FaceDetector, OutputCodec, Quality, TransformOptions, Transformer,
};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color))),
        ImageFormat::Png,
    )
}

fn solid_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 80, 160]))),
        ImageFormat::Jpeg,
    )
}

/// Left half red, right half blue.
fn split_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

fn transformer() -> Transformer {
    Transformer::new(&Config::default()).unwrap()
}

fn run(source: &[u8], options: &str) -> cutout_core::EncodedImage {
    transformer()
        .transform(source, &TransformOptions::parse(options))
        .unwrap()
}

fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
    image::load_from_memory(bytes).unwrap().dimensions()
}

/// Keeps the last image handed to the codec, then encodes it for real.
#[derive(Clone, Default)]
struct RecordingCodec {
    last: Arc<Mutex<Option<DynamicImage>>>,
}

impl RecordingCodec {
    fn take(&self) -> DynamicImage {
        self.last.lock().unwrap().take().unwrap()
    }
}

impl Codec for RecordingCodec {
    fn encode(
        &self,
        image: &DynamicImage,
        codec: OutputCodec,
        quality: Quality,
    ) -> Result<Vec<u8>, PipelineError> {
        *self.last.lock().unwrap() = Some(image.clone());
        JpegCodec.encode(image, codec, quality)
    }
}

fn recording(detector: Option<Box<dyn FaceDetector>>) -> (Transformer, RecordingCodec) {
    let codec = RecordingCodec::default();
    let mut transformer = transformer().with_codec(Box::new(codec.clone()));
    if let Some(detector) = detector {
        transformer = transformer.with_detector(detector);
    }
    (transformer, codec)
}

struct FixedFaces(Vec<FaceBox>);

impl FaceDetector for FixedFaces {
    fn detect(&self, _source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
        Ok(self.0.clone())
    }
}

struct BrokenDetector;

impl FaceDetector for BrokenDetector {
    fn detect(&self, _source: &[u8]) -> Result<Vec<FaceBox>, PipelineError> {
        Err(PipelineError::FaceDetection {
            message: "no model".into(),
        })
    }
}

#[test]
fn test_plain_resize_is_exact() {
    let out = run(&solid_jpeg(800, 600), "w_123,h_77");
    assert_eq!((out.width, out.height), (123, 77));
    assert_eq!(decoded_dimensions(&out.bytes), (123, 77));
    assert_eq!(out.codec.mime_type(), "image/jpeg");
}

#[test]
fn test_single_axis_keeps_aspect_ratio() {
    let out = run(&solid_jpeg(800, 600), "w_400");
    assert_eq!((out.width, out.height), (400, 300));
    let out = run(&solid_jpeg(800, 600), "h_0.5");
    assert_eq!((out.width, out.height), (400, 300));
}

#[test]
fn test_garbage_width_keeps_source_size() {
    let out = run(&solid_jpeg(800, 600), "w_abc");
    assert_eq!((out.width, out.height), (800, 600));
}

#[test]
fn test_fill_contains_source_in_target() {
    let (transformer, codec) = recording(None);
    let out = transformer
        .transform(
            &solid_png(800, 600, [10, 200, 10]),
            &TransformOptions::parse("w_200,h_200,c_fill"),
        )
        .unwrap();
    assert_eq!((out.width, out.height), (200, 200));

    let image = codec.take().to_rgb8();
    // Letterbox rows take the flatten background
    assert_eq!(image.get_pixel(100, 5), &Rgb([250, 250, 250]));
    assert_eq!(image.get_pixel(100, 195), &Rgb([250, 250, 250]));
    assert_eq!(image.get_pixel(100, 100), &Rgb([10, 200, 10]));
}

#[test]
fn test_fill_on_jpeg_source_drops_transparency_to_white() {
    let (transformer, codec) = recording(None);
    transformer
        .transform(&solid_jpeg(800, 600), &TransformOptions::parse("w_200,h_200,c_fill"))
        .unwrap();
    let image = codec.take().to_rgb8();
    assert_eq!(image.get_pixel(100, 5), &Rgb([255, 255, 255]));
}

// Pad scales to cover, so content is never smaller than the canvas and
// the equal-margin case cannot occur; centering is an even clip here.
#[test]
fn test_pad_is_exact_and_covered() {
    let (transformer, codec) = recording(None);
    let out = transformer
        .transform(
            &solid_png(800, 600, [10, 200, 10]),
            &TransformOptions::parse("w_200,h_200,c_pad"),
        )
        .unwrap();
    assert_eq!((out.width, out.height), (200, 200));
    let image = codec.take().to_rgb8();
    assert!(image.pixels().all(|p| *p == Rgb([10, 200, 10])));
}

#[test]
fn test_thumb_covers_target() {
    let out = run(&solid_jpeg(800, 600), "w_300,h_100,c_thumb");
    assert!(out.width >= 300);
    assert!(out.height >= 100);
}

#[test]
fn test_face_gravity_without_faces_matches_center() {
    let source = split_png(800, 400);
    let t = transformer();
    let centered = t
        .transform(&source, &TransformOptions::parse("w_100,h_100,c_thumb"))
        .unwrap();
    let face = t
        .transform(&source, &TransformOptions::parse("w_100,h_100,c_thumb,g_face"))
        .unwrap();
    assert_eq!(centered.bytes, face.bytes);
}

#[test]
fn test_face_gravity_frames_detected_face() {
    let source = split_png(800, 400);

    let (centered, centered_codec) = recording(None);
    centered
        .transform(&source, &TransformOptions::parse("w_100,h_100,c_thumb"))
        .unwrap();
    // Center crop spans the red/blue seam
    let center_image = centered_codec.take().to_rgb8();
    assert!(center_image.get_pixel(95, 50)[2] > 200);

    // A face in the red half pulls the crop entirely into red
    let detector = FixedFaces(vec![FaceBox::new(100.0, 200.0, 200.0, 100.0)]);
    let (faced, faced_codec) = recording(Some(Box::new(detector)));
    faced
        .transform(&source, &TransformOptions::parse("w_100,h_100,c_thumb,g_face"))
        .unwrap();
    let face_image = faced_codec.take().to_rgb8();
    assert!(face_image.pixels().all(|p| p[0] > 200 && p[2] < 50));
}

#[test]
fn test_detector_failure_is_absorbed() {
    let source = split_png(200, 100);
    let broken = transformer().with_detector(Box::new(BrokenDetector));
    let out = broken
        .transform(&source, &TransformOptions::parse("w_50,h_50,c_thumb,g_face"))
        .unwrap();
    let expected = run(&source, "w_50,h_50,c_thumb");
    assert_eq!(out.bytes, expected.bytes);
}

#[test]
fn test_radius_max_masks_corners() {
    let (transformer, codec) = recording(None);
    transformer
        .transform(
            &solid_png(100, 100, [10, 20, 30]),
            &TransformOptions::parse("r_max"),
        )
        .unwrap();
    let image = codec.take().to_rgb8();
    assert_eq!(image.get_pixel(50, 50), &Rgb([10, 20, 30]));
    assert_eq!(image.get_pixel(0, 0), &Rgb([250, 250, 250]));
    assert_eq!(image.get_pixel(99, 99), &Rgb([250, 250, 250]));
}

#[test]
fn test_border_adds_twice_its_width() {
    let out = run(
        &solid_png(300, 300, [10, 20, 30]),
        "w_100,h_100,c_thumb,r_max,bo_5px_solid_white",
    );
    assert_eq!((out.width, out.height), (110, 110));
    assert_eq!(decoded_dimensions(&out.bytes), (110, 110));
}

#[test]
fn test_unknown_border_color_fails() {
    let err = transformer()
        .transform(
            &solid_png(100, 100, [0, 0, 0]),
            &TransformOptions::parse("r_max,bo_2px_solid_notacolour"),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidColorName { ref name } if name == "notacolour"));
}

#[test]
fn test_png_alpha_is_flattened_onto_background() {
    let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0]));
    img.put_pixel(10, 10, Rgba([0, 0, 255, 255]));
    let source = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

    let (transformer, codec) = recording(None);
    transformer
        .transform(&source, &TransformOptions::default())
        .unwrap();
    let image = codec.take().to_rgb8();
    assert_eq!(image.get_pixel(0, 0), &Rgb([250, 250, 250]));
    assert_eq!(image.get_pixel(10, 10), &Rgb([0, 0, 255]));
}

#[test]
fn test_configured_background_is_used() {
    let mut config = Config::default();
    config.encode.background = [0, 0, 0];
    let codec = RecordingCodec::default();
    let transformer = Transformer::new(&config)
        .unwrap()
        .with_codec(Box::new(codec.clone()));
    transformer
        .transform(&solid_png(40, 40, [200, 200, 200]), &TransformOptions::parse("r_max"))
        .unwrap();
    assert_eq!(codec.take().to_rgb8().get_pixel(0, 0), &Rgb([0, 0, 0]));
}

#[test]
fn test_bmp_source_is_unsupported() {
    let source = encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]))),
        ImageFormat::Bmp,
    );
    let err = transformer()
        .transform(&source, &TransformOptions::parse("w_8"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat { ref format } if format == "bmp"));
}

#[test]
fn test_undecodable_source_fails() {
    let err = transformer()
        .transform(b"definitely not pixels", &TransformOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Decode { .. }));
}

#[test]
fn test_same_input_gives_identical_bytes() {
    let source = split_png(640, 480);
    let options = "w_150,h_150,c_thumb,g_face,r_max,bo_3px_solid_navy,q_80";
    let first = run(&source, options);
    let second = run(&source, options);
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_quality_changes_output_size() {
    let img = RgbImage::from_fn(128, 128, |x, y| {
        Rgb([(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 2) as u8])
    });
    let source = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);
    let high = run(&source, "q_100");
    let low = run(&source, "q_10");
    assert!(low.bytes.len() < high.bytes.len());
}

#[test]
fn test_shared_transformer_across_threads() {
    let transformer = Arc::new(transformer());
    let source = Arc::new(split_png(320, 240));
    let expected = transformer
        .transform(&source, &TransformOptions::parse("w_64,h_64,c_thumb,r_max"))
        .unwrap()
        .bytes;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let transformer = Arc::clone(&transformer);
            let source = Arc::clone(&source);
            std::thread::spawn(move || {
                transformer
                    .transform(&source, &TransformOptions::parse("w_64,h_64,c_thumb,r_max"))
                    .unwrap()
                    .bytes
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
