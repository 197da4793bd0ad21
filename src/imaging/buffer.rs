//! Owned pixel and payload types passed between pipeline stages.
//!
//! [`PixelBuffer`] is the working representation: row-major RGBA8 with the
//! length invariant `width * height * 4` checked at construction. Stages take
//! buffers by value and hand new ones on, so no stage keeps a buffer it has
//! passed along.

use base64::{Engine as _, engine::general_purpose};
use std::fmt;
use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BufferError {
    #[error("Pixel buffer dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("Pixel buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// In-memory RGBA8 raster.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 samples, checking the dimension and length invariants.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BufferError> {
        let count = width as usize * height as usize;
        let data = rgba.repeat(count);
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw samples, row-major, `[R, G, B, A]` per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Length of one row in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Container formats the pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Jpeg,
}

impl MediaType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Compressed output of the pipeline. Immutable once produced.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    media_type: MediaType,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(media_type: MediaType, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            media_type,
            width,
            height,
            bytes,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Dimensions of the raster that was encoded.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>`, ready to assign to a display surface.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type.mime_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("media_type", &self.media_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_length() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            BufferError::LengthMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15,
            }
        );
    }

    #[test]
    fn new_rejects_zero_dimension() {
        assert!(matches!(
            PixelBuffer::new(0, 4, Vec::new()),
            Err(BufferError::ZeroDimension { .. })
        ));
        assert!(matches!(
            PixelBuffer::new(4, 0, Vec::new()),
            Err(BufferError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn filled_sets_every_pixel() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buf.as_bytes().len(), 3 * 2 * 4);
        assert!(buf.pixels().all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let mut data = vec![0u8; 2 * 2 * 4];
        // (1, 1) is the fourth pixel
        data[12..16].copy_from_slice(&[9, 8, 7, 6]);
        let buf = PixelBuffer::new(2, 2, data).unwrap();
        assert_eq!(buf.pixel(1, 1), Some([9, 8, 7, 6]));
        assert_eq!(buf.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(buf.pixel(2, 0), None);
    }

    #[test]
    fn debug_omits_sample_data() {
        let buf = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        assert_eq!(
            format!("{buf:?}"),
            "PixelBuffer { width: 2, height: 2, bytes: 16 }"
        );
    }

    #[test]
    fn data_url_has_mime_and_base64_payload() {
        let img = EncodedImage::new(MediaType::Jpeg, 1, 1, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(img.to_data_url(), "data:image/jpeg;base64,/9j/");
    }
}
