//! Parameter types and limits for the imaging pipeline.
//!
//! These describe *how much* the pipeline is allowed to do, not *how* it does
//! it. The constants are the stock values; [`Limits`] carries them through the
//! pipeline so a loaded `config.toml` can override them.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality on a `[0, 1]` scale (default 0.85). Clamped on construction.
//! - [`Limits`] — Upload ceiling, output bound, brightness boost and encode quality for one pipeline.

use serde::{Deserialize, Serialize};

/// Largest accepted upload, in bytes (5 MiB). An upload of exactly this size passes.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Longest allowed output edge, in pixels.
pub const MAX_OUTPUT_DIMENSION: u32 = 800;

/// Per-channel boost applied by the `bright` filter.
pub const BRIGHTNESS_DELTA: u8 = 30;

/// Quality used when encoding the preview image.
pub const ENCODE_QUALITY: f32 = 0.85;

/// Quality setting for lossy image encoding (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    /// Build a quality value, clamping into `[0, 1]`. NaN maps to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1-100 scale JPEG encoders take.
    pub fn as_percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(ENCODE_QUALITY)
    }
}

/// Resource limits and tuning for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Uploads larger than this many bytes are rejected before decode.
    pub max_upload_bytes: u64,
    /// Both output edges are bounded by this many pixels.
    pub max_dimension: u32,
    /// Amount added to each color channel by the `bright` filter.
    pub brightness_delta: u8,
    /// Encode quality in `[0, 1]`.
    pub quality: f32,
}

impl Limits {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_dimension: MAX_OUTPUT_DIMENSION,
            brightness_delta: BRIGHTNESS_DELTA,
            quality: ENCODE_QUALITY,
        }
    }
}
