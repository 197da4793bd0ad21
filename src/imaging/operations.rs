//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they work out
//! what the output should look like, then hand the pixel work to the backend.

use super::backend::ImageBackend;
use super::buffer::PixelBuffer;
use super::calculations::calculate_fit_dimensions;
use tracing::debug;

/// Bound `buffer` by `max_w` x `max_h`, preserving aspect ratio.
///
/// Strictly downscale-or-identity: a buffer that already fits is returned
/// as-is without calling the backend.
pub fn resize(
    backend: &impl ImageBackend,
    buffer: PixelBuffer,
    max_w: u32,
    max_h: u32,
) -> PixelBuffer {
    let source = buffer.dimensions();
    let (width, height) = calculate_fit_dimensions(source, (max_w, max_h));

    if (width, height) == source {
        debug!(width, height, "image already within bounds");
        return buffer;
    }

    debug!(
        from_width = source.0,
        from_height = source.1,
        width,
        height,
        "resampling"
    );
    backend.resample(buffer, width, height)
}
