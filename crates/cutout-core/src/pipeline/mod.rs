//! Image transformation pipeline components.
//!
//! - **validate**: Size and magic-byte checks before decoding
//! - **decode**: Content-sniffed decoding of source bytes
//! - **dimensions**: Target size resolution from `w`/`h` requests
//! - **face** / **focal**: Face detection and focal-point location
//! - **strategy**: The four crop modes
//! - **mask** / **color**: Circular mask and ring border
//! - **encode**: Alpha handling and JPEG output
//! - **processor**: Orchestrates the full pipeline

pub mod color;
pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod face;
pub mod focal;
pub mod mask;
pub mod processor;
#[cfg(feature = "rustface")]
pub mod rustface_backend;
pub mod strategy;
pub mod validate;

// Re-exports for convenient access
pub use encode::{Codec, JpegCodec};
pub use face::{detector_from_config, FaceDetector, NoFaceDetector};
pub use processor::Transformer;
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;
pub use validate::Validator;
