//! Cheap checks on source bytes before a full decode.

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates source buffers before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Reject buffers that are too large or do not start like an image.
    pub fn validate(&self, bytes: &[u8]) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(PipelineError::FileTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                message: "Source too small to be a valid image".to_string(),
            });
        }

        if !has_image_signature(bytes) {
            return Err(PipelineError::Decode {
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    pub fn max_dimension(&self) -> u32 {
        self.limits.max_image_dimension
    }

    /// Reject images and canvases over the dimension limit.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), PipelineError> {
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                width,
                height,
                max_dim,
            });
        }
        Ok(())
    }
}

/// Whether the buffer starts with a known image signature.
fn has_image_signature(bytes: &[u8]) -> bool {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => true,
        [0x89, b'P', b'N', b'G', ..] => true,
        [b'G', b'I', b'F', b'8', ..] => true,
        [b'R', b'I', b'F', b'F', _, _, _, _, rest @ ..] => {
            // Truncated RIFF headers are let through to the decoder
            rest.len() < 4 || rest.starts_with(b"WEBP")
        }
        [b'R', b'I', b'F', b'F', ..] => true,
        [b'B', b'M', ..] => true,
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => true,
        _ => false,
    }
}
