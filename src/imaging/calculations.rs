//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output dimensions for fitting `source` inside `max`.
///
/// One uniform scale factor is applied to both axes, so aspect ratio is kept
/// and nothing is cropped. The dominant axis is clamped first: when
/// `width >= height` the width is clamped to `max_w` (only if it exceeds it)
/// and the height derived as `round(height * max_w / width)`; the portrait
/// case is symmetric. If the derived edge still exceeds its own maximum
/// (possible with non-square bounds), the scale is re-derived from that edge.
///
/// Images that already fit are returned unchanged: this never upscales.
/// Derived edges are rounded and never drop below 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use tee_preview::imaging::calculate_fit_dimensions;
/// // 1600x1200 into 800x800 → 800x600
/// assert_eq!(calculate_fit_dimensions((1600, 1200), (800, 800)), (800, 600));
///
/// // Already fits → unchanged
/// assert_eq!(calculate_fit_dimensions((640, 480), (800, 800)), (640, 480));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = (max.0.max(1), max.1.max(1));

    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }

    let (w, h) = if src_w >= src_h {
        // Landscape or square
        if src_w > max_w {
            (max_w, scale_edge(src_h, max_w, src_w))
        } else {
            (src_w, src_h)
        }
    } else {
        // Portrait
        if src_h > max_h {
            (scale_edge(src_w, max_h, src_h), max_h)
        } else {
            (src_w, src_h)
        }
    };

    // Secondary axis can still overflow when the bounds are not square
    if h > max_h {
        (scale_edge(src_w, max_h, src_h), max_h)
    } else if w > max_w {
        (max_w, scale_edge(src_h, max_w, src_w))
    } else {
        (w, h)
    }
}

/// `round(edge * numerator / denominator)`, never below 1.
fn scale_edge(edge: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (edge as f64 * numerator as f64 / denominator as f64).round() as u32;
    scaled.max(1)
}
