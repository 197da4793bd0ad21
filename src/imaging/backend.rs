//! Image processing backend trait and shared error types.
//!
//! The [`ImageBackend`] trait defines the three operations that touch a
//! container format or do heavy pixel work: decode, resample and encode.
//! Everything else (validation, dimension math, color filters) is
//! backend-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so stage call counts can be asserted.

use super::buffer::{EncodedImage, PixelBuffer};
use super::params::Quality;
use super::validate::RawUpload;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Corrupt image data: {0}")]
    CorruptData(String),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Encoding failed: {0}")]
    EncodeFailure(String),
}

/// Trait for image processing backends.
///
/// Implementations hold no per-image state, so one backend can serve any
/// number of concurrent pipelines.
pub trait ImageBackend: Sync {
    /// Turn an upload's bytes into an RGBA8 buffer.
    fn decode(&self, upload: &RawUpload) -> Result<PixelBuffer, DecodeError>;

    /// Resample `buffer` to exactly `width` x `height`. Must be deterministic.
    fn resample(&self, buffer: PixelBuffer, width: u32, height: u32) -> PixelBuffer;

    /// Compress `buffer` into the output container.
    fn encode(&self, buffer: PixelBuffer, quality: Quality) -> Result<EncodedImage, EncodeError>;
}

impl<B: ImageBackend + ?Sized> ImageBackend for &B {
    fn decode(&self, upload: &RawUpload) -> Result<PixelBuffer, DecodeError> {
        (**self).decode(upload)
    }

    fn resample(&self, buffer: PixelBuffer, width: u32, height: u32) -> PixelBuffer {
        (**self).resample(buffer, width, height)
    }

    fn encode(&self, buffer: PixelBuffer, quality: Quality) -> Result<EncodedImage, EncodeError> {
        (**self).encode(buffer, quality)
    }
}
