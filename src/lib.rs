//! # tee-preview
//!
//! Image ingestion for t-shirt design previews. A user-supplied upload is
//! checked, decoded, bounded to a safe size, run through one of a small fixed
//! set of color filters, and re-encoded as a JPEG the preview surface can
//! display directly.
//!
//! # Architecture: Five-Stage Pipeline
//!
//! ```text
//! 1. Validate  RawUpload    →  ()            (media type + size, no decode)
//! 2. Decode    RawUpload    →  PixelBuffer   (RGBA8, any supported container)
//! 3. Resize    PixelBuffer  →  PixelBuffer   (fit within 800x800, never upscale)
//! 4. Filter    PixelBuffer  →  PixelBuffer   (normal/grayscale/sepia/vintage/bright)
//! 5. Encode    PixelBuffer  →  EncodedImage  (JPEG, quality 0.85)
//! ```
//!
//! The buffer coming out of stage 3 is kept, so switching filters only
//! re-runs stages 4 and 5.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel types, validation, dimension math, backend trait, filters |
//! | [`pipeline`] | Orchestrator, per-image session state machine, batch ingestion |
//! | [`config`] | `config.toml` loading, validation and merging over stock limits |
//! | [`files`] | Reading uploads from disk, writing previews, batch runs over files |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Owned Buffers Between Stages
//!
//! Each stage takes its input by value and returns a fresh buffer, so no two
//! stages ever alias the same pixels. Independent images can be processed on
//! separate threads without locks.
//!
//! ## Closed Filter Set
//!
//! Filters are a `FilterKind` enum matched exhaustively. There is no
//! "unknown filter" failure past the parsing boundary.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and JPEG encoding all go through the `image`
//! crate. No system libraries are needed and nothing touches the filesystem
//! or network inside the pipeline; [`files`] is the only layer that does.

pub mod config;
pub mod files;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
