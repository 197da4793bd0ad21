//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Validate** | metadata check, no decode |
//! | **Decode** | `image::ImageReader` (JPEG, PNG, GIF, WebP) |
//! | **Resize** | fit-within-bounds math + Lanczos3 |
//! | **Filter** | per-pixel color transforms, rows in parallel via `rayon` |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Buffer**: Owned [`PixelBuffer`] / [`EncodedImage`] value types
//! - **Validate**: [`RawUpload`] and the pre-decode check
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`Quality`], [`Limits`] and the stock constants
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Filters**: [`FilterKind`] and the color transforms
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod buffer;
mod calculations;
pub mod filters;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod validate;

pub use backend::{DecodeError, EncodeError, ImageBackend};
pub use buffer::{BufferError, EncodedImage, MediaType, PixelBuffer};
pub use calculations::calculate_fit_dimensions;
pub use filters::{FilterKind, apply_filter, apply_filter_with};
pub use operations::resize;
pub use params::{
    BRIGHTNESS_DELTA, ENCODE_QUALITY, Limits, MAX_OUTPUT_DIMENSION, MAX_UPLOAD_BYTES, Quality,
};
pub use rust_backend::RustBackend;
pub use validate::{DataUrlError, RawUpload, ValidationError, validate, validate_declared};
