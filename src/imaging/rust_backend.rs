//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::ImageReader` with content sniffing |
//! | Resample | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! The container is sniffed from the bytes, never from the declared media
//! type. Animated GIF and WebP decode to their first frame. JPEG has no alpha
//! channel, so encoding drops it.

use super::backend::{DecodeError, EncodeError, ImageBackend};
use super::buffer::{EncodedImage, MediaType, PixelBuffer};
use super::params::Quality;
use super::validate::RawUpload;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn map_decode_error(err: image::ImageError) -> DecodeError {
    match err {
        image::ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        other => DecodeError::CorruptData(other.to_string()),
    }
}

fn to_rgba_image(buffer: PixelBuffer) -> RgbaImage {
    let (w, h) = buffer.dimensions();
    RgbaImage::from_raw(w, h, buffer.into_bytes())
        .expect("PixelBuffer length always matches its dimensions")
}

fn from_rgba_image(img: RgbaImage) -> Result<PixelBuffer, DecodeError> {
    let (w, h) = img.dimensions();
    PixelBuffer::new(w, h, img.into_raw()).map_err(|e| DecodeError::CorruptData(e.to_string()))
}

impl ImageBackend for RustBackend {
    fn decode(&self, upload: &RawUpload) -> Result<PixelBuffer, DecodeError> {
        let reader = ImageReader::new(Cursor::new(upload.bytes()))
            .with_guessed_format()
            .map_err(|e| DecodeError::CorruptData(e.to_string()))?;

        match reader.format() {
            Some(format) if format.reading_enabled() => {}
            Some(format) => {
                return Err(DecodeError::UnsupportedFormat(format!(
                    "no decoder compiled in for {format:?}"
                )));
            }
            None => {
                return Err(DecodeError::UnsupportedFormat(
                    "content is not a recognized raster image".into(),
                ));
            }
        }

        let img = reader.decode().map_err(map_decode_error)?;
        from_rgba_image(img.into_rgba8())
    }

    fn resample(&self, buffer: PixelBuffer, width: u32, height: u32) -> PixelBuffer {
        let (width, height) = (width.max(1), height.max(1));
        if buffer.dimensions() == (width, height) {
            return buffer;
        }
        let img = to_rgba_image(buffer);
        let resized = image::imageops::resize(&img, width, height, FilterType::Lanczos3);
        let (w, h) = resized.dimensions();
        PixelBuffer::new(w, h, resized.into_raw())
            .expect("imageops::resize returns a buffer matching its dimensions")
    }

    fn encode(&self, buffer: PixelBuffer, quality: Quality) -> Result<EncodedImage, EncodeError> {
        let (w, h) = buffer.dimensions();
        let rgb = DynamicImage::ImageRgba8(to_rgba_image(buffer)).into_rgb8();

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.as_percent())
            .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
            .map_err(|e| EncodeError::EncodeFailure(e.to_string()))?;

        Ok(EncodedImage::new(MediaType::Jpeg, w, h, bytes))
    }
}
