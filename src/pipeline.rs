//! Upload-to-preview orchestration.
//!
//! [`Pipeline`] is the only entry point external collaborators need. It runs
//!
//! ```text
//! Validate → Decode → Resize(800, 800) → Filter → Encode(0.85)
//! ```
//!
//! and stops at the first failing stage. The resized, unfiltered buffer is
//! handed back with the encoded image so a different filter can be rendered
//! later via [`Pipeline::reapply_filter`] without decoding again.
//!
//! [`Session`] wraps that contract in the per-image state machine:
//!
//! ```text
//! Empty → Validated → Decoded → Resized → Filtered → Encoded
//!                                            ↑          │
//!                                            └──────────┘  (filter change)
//! ```
//!
//! A session serializes its own operations through `&mut self`; separate
//! sessions (and [`ingest_batch`]) share nothing and can run concurrently.

use crate::imaging::{
    DecodeError, EncodeError, EncodedImage, FilterKind, ImageBackend, Limits, PixelBuffer,
    RawUpload, RustBackend, ValidationError, apply_filter_with, resize, validate,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Where an image is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Empty,
    Validated,
    Decoded,
    Resized,
    Filtered,
    Encoded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Empty => "empty",
            Stage::Validated => "validated",
            Stage::Decoded => "decoded",
            Stage::Resized => "resized",
            Stage::Filtered => "filtered",
            Stage::Encoded => "encoded",
        };
        f.write_str(name)
    }
}

/// The step that rejected an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedStage {
    Validate,
    Decode,
    Encode,
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailedStage::Validate => "validate",
            FailedStage::Decode => "decode",
            FailedStage::Encode => "encode",
        })
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),
}

impl PipelineError {
    /// The step that produced this error.
    pub fn stage(&self) -> FailedStage {
        match self {
            PipelineError::Validation(_) => FailedStage::Validate,
            PipelineError::Decode(_) => FailedStage::Decode,
            PipelineError::Encode(_) => FailedStage::Encode,
        }
    }
}

/// Result of a successful ingest.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Post-resize, pre-filter buffer. Keep it to re-render other filters.
    pub resized: PixelBuffer,
    /// The filtered, encoded preview.
    pub image: EncodedImage,
    /// Dimensions of the decoded upload, before resizing.
    pub original_dimensions: (u32, u32),
}

/// Stateless orchestrator over a backend and a set of limits.
pub struct Pipeline<B: ImageBackend = RustBackend> {
    backend: B,
    limits: Limits,
}

impl Pipeline<RustBackend> {
    /// Production pipeline with stock limits.
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new(), Limits::default())
    }
}

impl Default for Pipeline<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn with_backend(backend: B, limits: Limits) -> Self {
        Self { backend, limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate, decode, resize and encode with the `normal` filter.
    pub fn ingest(&self, upload: RawUpload) -> Result<Ingested, PipelineError> {
        self.ingest_with_filter(upload, FilterKind::Normal)
    }

    /// [`ingest`](Self::ingest), rendering `kind` instead of `normal`.
    pub fn ingest_with_filter(
        &self,
        upload: RawUpload,
        kind: FilterKind,
    ) -> Result<Ingested, PipelineError> {
        if let Err(e) = validate(&upload, &self.limits) {
            warn!(media_type = upload.media_type(), bytes = upload.len(), "upload rejected: {e}");
            return Err(e.into());
        }
        debug!(media_type = upload.media_type(), bytes = upload.len(), "upload validated");

        let decoded = self.backend.decode(&upload)?;
        drop(upload);
        let original_dimensions = decoded.dimensions();
        debug!(
            width = original_dimensions.0,
            height = original_dimensions.1,
            "decoded"
        );

        let max = self.limits.max_dimension;
        let resized = resize(&self.backend, decoded, max, max);
        let image = self.reapply_filter(&resized, kind)?;

        Ok(Ingested {
            resized,
            image,
            original_dimensions,
        })
    }

    /// Filter and encode a buffer produced by an earlier ingest.
    ///
    /// Never validates, decodes or resizes.
    pub fn reapply_filter(
        &self,
        resized: &PixelBuffer,
        kind: FilterKind,
    ) -> Result<EncodedImage, PipelineError> {
        let filtered = apply_filter_with(resized, kind, self.limits.brightness_delta);
        debug!(filter = %kind, "filter applied");

        let image = self.backend.encode(filtered, self.limits.quality())?;
        debug!(bytes = image.len(), media_type = %image.media_type(), "encoded");
        Ok(image)
    }
}

/// Ingest independent uploads concurrently, one result per input, in order.
pub fn ingest_batch<B: ImageBackend>(
    pipeline: &Pipeline<B>,
    uploads: Vec<RawUpload>,
    kind: FilterKind,
) -> Vec<Result<Ingested, PipelineError>> {
    uploads
        .into_par_iter()
        .map(|upload| pipeline.ingest_with_filter(upload, kind))
        .collect()
}

/// One uploaded image and its selected filter.
///
/// Each call runs its stages to completion, so between calls
/// [`stage`](Self::stage) is either `Empty` or `Encoded`. The intermediate
/// stages are only passed through inside [`upload`](Self::upload) and
/// [`select_filter`](Self::select_filter).
pub struct Session<B: ImageBackend = RustBackend> {
    pipeline: Pipeline<B>,
    stage: Stage,
    filter: FilterKind,
    resized: Option<PixelBuffer>,
    current: Option<EncodedImage>,
}

impl<B: ImageBackend> Session<B> {
    pub fn new(pipeline: Pipeline<B>) -> Self {
        Self {
            pipeline,
            stage: Stage::Empty,
            filter: FilterKind::Normal,
            resized: None,
            current: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selected_filter(&self) -> FilterKind {
        self.filter
    }

    /// The most recently rendered preview, if an image is loaded.
    pub fn current(&self) -> Option<&EncodedImage> {
        self.current.as_ref()
    }

    /// The retained post-resize buffer, if an image is loaded.
    pub fn resized(&self) -> Option<&PixelBuffer> {
        self.resized.as_ref()
    }

    pub fn pipeline(&self) -> &Pipeline<B> {
        &self.pipeline
    }

    /// Replace the session's image, rendering it with the selected filter.
    ///
    /// On failure the previously loaded image (if any) stays in place.
    pub fn upload(&mut self, upload: RawUpload) -> Result<&EncodedImage, PipelineError> {
        let ingested = self.pipeline.ingest_with_filter(upload, self.filter)?;
        self.resized = Some(ingested.resized);
        self.stage = Stage::Encoded;
        Ok(self.current.insert(ingested.image))
    }

    /// Switch filters and re-render from the retained buffer.
    ///
    /// Without a loaded image this does nothing and returns `Ok(None)`; the
    /// selection is left unchanged.
    pub fn select_filter(
        &mut self,
        kind: FilterKind,
    ) -> Result<Option<&EncodedImage>, PipelineError> {
        let Some(resized) = self.resized.as_ref() else {
            return Ok(None);
        };

        let image = self.pipeline.reapply_filter(resized, kind)?;
        self.filter = kind;
        Ok(Some(self.current.insert(image)))
    }

    /// Drop the loaded image and return to `Empty`. The filter selection stays.
    pub fn clear(&mut self) {
        self.resized = None;
        self.current = None;
        self.stage = Stage::Empty;
    }
}
