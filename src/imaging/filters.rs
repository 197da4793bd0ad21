//! Per-pixel color filters.
//!
//! | Filter | Transform (R, G, B) → (R', G', B') |
//! |---|---|
//! | `normal` | identity |
//! | `grayscale` | `avg = (R + G + B) / 3` on every channel |
//! | `sepia` | `0.393R + 0.769G + 0.189B`, `0.349R + 0.686G + 0.168B`, `0.272R + 0.534G + 0.131B` |
//! | `vintage` | `0.9R + 20`, `0.7G + 20`, `0.5B + 20` |
//! | `bright` | `R + Δ`, `G + Δ`, `B + Δ` (Δ = 30 by default) |
//!
//! Results are computed in f64, rounded half to even and clamped to 255;
//! alpha is never touched. Filters always run on the resized original, never
//! on a previous filter's output.
//!
//! Every filter has non-negative coefficients and offsets, so results can
//! never go below zero and only the upper bound is clamped. A filter with a
//! negative coefficient would need a lower clamp as well.

use super::buffer::{CHANNELS, PixelBuffer};
use super::params::BRIGHTNESS_DELTA;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of color transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Normal,
    Grayscale,
    Sepia,
    Vintage,
    Bright,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Normal,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::Bright,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Normal => "normal",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Vintage => "vintage",
            FilterKind::Bright => "bright",
        }
    }

    /// Human label, as shown in a filter picker.
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Normal => "Normal",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Sepia => "Sepia",
            FilterKind::Vintage => "Vintage",
            FilterKind::Bright => "Brighter",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FilterKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = FilterKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown filter {wanted:?}, expected one of: {}", names.join(", "))
            })
    }
}

/// Round half to even and saturate, the way a canvas `Uint8ClampedArray`
/// stores a computed sample.
#[inline]
fn clamp_channel(v: f64) -> u8 {
    v.round_ties_even().min(255.0) as u8
}

/// Transform one RGBA pixel. Alpha passes through.
pub fn transform_pixel(kind: FilterKind, px: [u8; 4], brightness_delta: u8) -> [u8; 4] {
    let [r, g, b, a] = px;
    let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));

    match kind {
        FilterKind::Normal => px,
        FilterKind::Grayscale => {
            let avg = clamp_channel((rf + gf + bf) / 3.0);
            [avg, avg, avg, a]
        }
        FilterKind::Sepia => [
            clamp_channel(0.393 * rf + 0.769 * gf + 0.189 * bf),
            clamp_channel(0.349 * rf + 0.686 * gf + 0.168 * bf),
            clamp_channel(0.272 * rf + 0.534 * gf + 0.131 * bf),
            a,
        ],
        FilterKind::Vintage => [
            clamp_channel(0.9 * rf + 20.0),
            clamp_channel(0.7 * gf + 20.0),
            clamp_channel(0.5 * bf + 20.0),
            a,
        ],
        FilterKind::Bright => [
            r.saturating_add(brightness_delta),
            g.saturating_add(brightness_delta),
            b.saturating_add(brightness_delta),
            a,
        ],
    }
}

/// Apply `kind` to every pixel, returning a new buffer of the same size.
pub fn apply_filter(buffer: &PixelBuffer, kind: FilterKind) -> PixelBuffer {
    apply_filter_with(buffer, kind, BRIGHTNESS_DELTA)
}

/// [`apply_filter`] with an explicit `bright` boost.
///
/// Rows are transformed in parallel on the rayon pool.
pub fn apply_filter_with(buffer: &PixelBuffer, kind: FilterKind, brightness_delta: u8) -> PixelBuffer {
    if kind == FilterKind::Normal {
        return buffer.clone();
    }

    let (w, h) = buffer.dimensions();
    let mut data = buffer.as_bytes().to_vec();
    data.par_chunks_mut(buffer.stride()).for_each(|row| {
        for px in row.chunks_exact_mut(CHANNELS) {
            let out = transform_pixel(kind, [px[0], px[1], px[2], px[3]], brightness_delta);
            px.copy_from_slice(&out);
        }
    });

    PixelBuffer::new(w, h, data).expect("filtering preserves buffer length")
}
