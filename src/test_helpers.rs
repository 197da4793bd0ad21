//! Shared test utilities for the tee-preview test suite.
//!
//! Fixtures are synthesized in memory with the `image` crate, so no binary
//! files are checked in.

use crate::imaging::{PixelBuffer, RawUpload};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Deterministic pseudo-random RGBA buffer (alpha varies too).
pub fn noise_buffer(width: u32, height: u32) -> PixelBuffer {
    let mut state: u32 = 0x9E37_79B9 ^ (width << 16) ^ height;
    let len = width as usize * height as usize * 4;
    let data = (0..len)
        .map(|_| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    PixelBuffer::new(width, height, data).unwrap()
}

/// Encode a buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Vec<u8> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            buffer.as_bytes(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    bytes
}

/// A solid-color PNG upload declared as `image/png`.
pub fn png_upload(width: u32, height: u32, rgba: [u8; 4]) -> RawUpload {
    let buffer = PixelBuffer::filled(width, height, rgba).unwrap();
    RawUpload::new("image/png", encode_png(&buffer))
}
