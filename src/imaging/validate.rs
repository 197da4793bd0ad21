//! Upload validation.
//!
//! A pure check over upload metadata (declared media type and byte length)
//! that runs before any decode work. Pixel data is never inspected here.

use super::params::Limits;
use base64::{Engine as _, engine::general_purpose};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Not an image: declared media type is {0:?}")]
    NotAnImage(String),
    #[error("Upload too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("Missing `data:` prefix")]
    MissingPrefix,
    #[error("Missing `;base64,` marker")]
    MissingBase64Marker,
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Bytes handed over by the upload collaborator, plus their declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct RawUpload {
    media_type: String,
    bytes: Vec<u8>,
}

impl RawUpload {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Parse a `data:<media type>;base64,<payload>` string.
    pub fn from_data_url(url: &str) -> Result<Self, DataUrlError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUrlError::MissingPrefix)?;
        let (media_type, payload) = rest
            .split_once(";base64,")
            .ok_or(DataUrlError::MissingBase64Marker)?;
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))?;
        Ok(Self::new(media_type, bytes))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawUpload")
            .field("media_type", &self.media_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// True when `media_type` starts with `image/`. Case-sensitive, as browsers
/// report media types in lowercase.
fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Reject non-images and oversized uploads.
///
/// The size boundary is inclusive: an upload of exactly
/// `limits.max_upload_bytes` passes.
pub fn validate(upload: &RawUpload, limits: &Limits) -> Result<(), ValidationError> {
    validate_declared(upload.media_type(), upload.len(), limits)
}

/// [`validate`] from a declared media type and size, before any bytes are
/// in memory.
pub fn validate_declared(
    media_type: &str,
    size: u64,
    limits: &Limits,
) -> Result<(), ValidationError> {
    if !is_image_media_type(media_type) {
        return Err(ValidationError::NotAnImage(media_type.to_string()));
    }
    if size > limits.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            size,
            limit: limits.max_upload_bytes,
        });
    }
    Ok(())
}

/// Media type for a file name, judged by extension.
///
/// Covers the formats the upload picker accepts; anything else is
/// `application/octet-stream` and will fail validation.
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn upload(media_type: &str, len: usize) -> RawUpload {
        RawUpload::new(media_type, vec![0; len])
    }

    #[test]
    fn accepts_four_mib_image() {
        assert_eq!(validate(&upload("image/png", 4 * MIB), &Limits::default()), Ok(()));
    }

    #[test]
    fn rejects_six_mib_image() {
        let err = validate(&upload("image/jpeg", 6 * MIB), &Limits::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: 6 * MIB as u64,
                limit: 5 * MIB as u64,
            }
        );
    }

    #[test]
    fn size_boundary_is_inclusive() {
        let limits = Limits::default();
        assert!(validate(&upload("image/gif", 5 * MIB), &limits).is_ok());
        assert!(validate(&upload("image/gif", 5 * MIB + 1), &limits).is_err());
    }

    #[test]
    fn rejects_text_plain_of_any_size() {
        let limits = Limits::default();
        for len in [0, 10, 6 * MIB] {
            assert!(matches!(
                validate(&upload("text/plain", len), &limits),
                Err(ValidationError::NotAnImage(_))
            ));
        }
    }

    #[test]
    fn declared_size_is_checked_without_bytes() {
        let limits = Limits::default();
        assert_eq!(
            validate_declared("image/png", 6 * MIB as u64, &limits),
            Err(ValidationError::TooLarge {
                size: 6 * MIB as u64,
                limit: 5 * MIB as u64,
            })
        );
        assert!(validate_declared("image/png", 5 * MIB as u64, &limits).is_ok());
    }

    #[test]
    fn media_type_check_precedes_size_check() {
        let err = validate(&upload("application/pdf", 6 * MIB), &Limits::default()).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnImage(_)));
    }

    #[test]
    fn media_type_only_checks_top_level() {
        assert!(is_image_media_type("image/x-anything"));
        assert!(!is_image_media_type("IMAGE/PNG"));
        assert!(!is_image_media_type(" image/png"));
        assert!(!is_image_media_type("image"));
        assert!(!is_image_media_type("imagery/png"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn data_url_parses_media_type_and_bytes() {
        let upload = RawUpload::from_data_url("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(upload.media_type(), "image/png");
        assert_eq!(upload.bytes(), &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn data_url_errors() {
        assert_eq!(
            RawUpload::from_data_url("image/png;base64,AAAA"),
            Err(DataUrlError::MissingPrefix)
        );
        assert_eq!(
            RawUpload::from_data_url("data:image/png,AAAA"),
            Err(DataUrlError::MissingBase64Marker)
        );
        assert!(matches!(
            RawUpload::from_data_url("data:image/png;base64,***"),
            Err(DataUrlError::InvalidBase64(_))
        ));
    }

    #[test]
    fn extension_media_types() {
        assert_eq!(media_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(media_type_for_extension("webp"), "image/webp");
        assert_eq!(media_type_for_extension("txt"), "application/octet-stream");
    }
}
