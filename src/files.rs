//! Uploads from disk and previews back to disk.
//!
//! The pipeline itself never touches the filesystem; this module is the
//! layer the CLI uses around it. A file is checked against the limits from
//! its extension and metadata first, so an oversized or non-image file is
//! rejected without its bytes ever being read.
//!
//! Previews are written as `<output dir>/<stem>-<filter>.jpg`.

use crate::imaging::validate::media_type_for_extension;
use crate::imaging::{
    EncodedImage, FilterKind, ImageBackend, Limits, RawUpload, ValidationError, validate_declared,
};
use crate::output::{IngestReport, ReportOutcome};
use crate::pipeline::{Pipeline, PipelineError, ingest_batch};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file on disk, checked before being read.
#[derive(Debug)]
pub struct FileUpload {
    /// Media type declared by the file extension.
    pub media_type: &'static str,
    /// Size from the file metadata.
    pub size: u64,
    /// The file contents, or the reason they were never read.
    pub upload: Result<RawUpload, ValidationError>,
}

/// Media type for `path`, judged by its extension.
pub fn declared_media_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(media_type_for_extension)
        .unwrap_or("application/octet-stream")
}

/// Read `path` as an upload, unless its declared type or size already fails
/// validation.
pub fn read_upload(path: &Path, limits: &Limits) -> io::Result<FileUpload> {
    let media_type = declared_media_type(path);
    let size = fs::metadata(path)?.len();
    let upload = match validate_declared(media_type, size, limits) {
        Ok(()) => Ok(RawUpload::new(media_type, fs::read(path)?)),
        Err(e) => {
            warn!(path = %path.display(), "not reading upload: {e}");
            Err(e)
        }
    };
    Ok(FileUpload {
        media_type,
        size,
        upload,
    })
}

/// `<dir>/<stem>-<filter>.jpg`
pub fn output_path(dir: &Path, source: &Path, filter: FilterKind) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "image".into());
    dir.join(format!("{stem}-{filter}.jpg"))
}

pub fn write_image(path: &Path, image: &EncodedImage) -> io::Result<()> {
    fs::write(path, image.as_bytes())?;
    info!(path = %path.display(), bytes = image.len(), "wrote preview");
    Ok(())
}

/// Ingest `files` in parallel and write each preview into `output_dir`.
///
/// Returns one report per file, in input order. A file that fails any
/// stage, or whose preview cannot be written, gets a failure report; the
/// rest of the batch still runs. Only an unreadable input aborts the batch,
/// and that happens before anything is processed.
pub fn ingest_files<B: ImageBackend>(
    pipeline: &Pipeline<B>,
    files: &[PathBuf],
    filter: FilterKind,
    output_dir: Option<&Path>,
) -> io::Result<Vec<IngestReport>> {
    let loaded = files
        .iter()
        .map(|f| read_upload(f, pipeline.limits()))
        .collect::<io::Result<Vec<_>>>()?;

    let mut declared = Vec::with_capacity(loaded.len());
    let mut rejected = Vec::with_capacity(loaded.len());
    let mut accepted = Vec::new();
    for FileUpload {
        media_type,
        size,
        upload,
    } in loaded
    {
        declared.push((media_type, size));
        match upload {
            Ok(upload) => {
                accepted.push(upload);
                rejected.push(None);
            }
            Err(e) => rejected.push(Some(PipelineError::from(e))),
        }
    }

    let mut results = ingest_batch(pipeline, accepted, filter).into_iter();
    let reports = files
        .iter()
        .zip(declared)
        .zip(rejected)
        .map(|((file, (media_type, upload_bytes)), rejection)| {
            let result = match rejection {
                Some(e) => Err(e),
                None => results
                    .next()
                    .expect("one batch result per accepted upload"),
            };
            let outcome = match result {
                Ok(ingested) => match output_dir.map(|d| output_path(d, file, filter)) {
                    Some(target) => match write_image(&target, &ingested.image) {
                        Ok(()) => ReportOutcome::ok(&ingested, filter, Some(&target)),
                        Err(e) => {
                            warn!(path = %target.display(), "write failed: {e}");
                            ReportOutcome::unwritten(&ingested, filter, &target, &e)
                        }
                    },
                    None => ReportOutcome::ok(&ingested, filter, None),
                },
                Err(e) => ReportOutcome::failed(&e),
            };
            IngestReport {
                source: file.display().to_string(),
                media_type: media_type.to_string(),
                upload_bytes,
                outcome,
            }
        })
        .collect();

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FailedStage;
    use crate::test_helpers::png_upload;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, png_upload(w, h, [255, 255, 255, 255]).bytes()).unwrap();
        path
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(declared_media_type(Path::new("a/dawn.PNG")), "image/png");
        assert_eq!(declared_media_type(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(declared_media_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn read_upload_within_limits() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "dawn.png", 4, 4);
        let file = read_upload(&path, &Limits::default()).unwrap();

        let upload = file.upload.unwrap();
        assert_eq!(upload.media_type(), "image/png");
        assert_eq!(upload.len(), file.size);
        assert_eq!(upload.bytes(), fs::read(&path).unwrap());
    }

    #[test]
    fn oversized_file_is_rejected_from_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.jpg");
        fs::write(&path, vec![0u8; 2048]).unwrap();
        let limits = Limits {
            max_upload_bytes: 1024,
            ..Limits::default()
        };

        let file = read_upload(&path, &limits).unwrap();
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.size, 2048);
        assert_eq!(
            file.upload.unwrap_err(),
            ValidationError::TooLarge {
                size: 2048,
                limit: 1024,
            }
        );
    }

    #[test]
    fn non_image_extension_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let file = read_upload(&path, &Limits::default()).unwrap();
        assert!(matches!(file.upload, Err(ValidationError::NotAnImage(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(read_upload(&tmp.path().join("gone.png"), &Limits::default()).is_err());
    }

    #[test]
    fn output_path_uses_stem_and_filter() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("in/dawn.png"), FilterKind::Sepia),
            Path::new("out/dawn-sepia.jpg")
        );
    }

    #[test]
    fn batch_keeps_going_past_rejections_and_write_failures() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();

        let ok = write_png(tmp.path(), "a.png", 40, 20);
        let big = tmp.path().join("b.png");
        fs::write(&big, vec![0u8; 4096]).unwrap();
        let blocked = write_png(tmp.path(), "c.png", 10, 10);
        // A directory where c's preview should go makes the write fail
        fs::create_dir(out.join("c-normal.jpg")).unwrap();
        let last = write_png(tmp.path(), "d.png", 30, 60);

        let limits = Limits {
            max_upload_bytes: 2048,
            ..Limits::default()
        };
        let pipeline = Pipeline::with_backend(crate::imaging::RustBackend::new(), limits);
        let files = vec![ok, big, blocked, last];
        let reports = ingest_files(&pipeline, &files, FilterKind::Normal, Some(&out)).unwrap();

        assert_eq!(reports.len(), 4);
        assert!(matches!(
            reports[0].outcome,
            ReportOutcome::Ok {
                preview: (40, 20),
                ..
            }
        ));
        assert!(matches!(
            reports[1].outcome,
            ReportOutcome::Failed {
                stage: FailedStage::Validate,
                ..
            }
        ));
        assert_eq!(reports[1].upload_bytes, 4096);
        assert!(matches!(reports[2].outcome, ReportOutcome::Unwritten { .. }));
        assert!(matches!(
            reports[3].outcome,
            ReportOutcome::Ok {
                preview: (30, 60),
                ..
            }
        ));
        assert!(out.join("a-normal.jpg").is_file());
        assert!(out.join("d-normal.jpg").is_file());
    }

    #[test]
    fn batch_without_output_dir_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let file = write_png(tmp.path(), "a.png", 8, 8);
        let pipeline = Pipeline::new();

        let reports = ingest_files(&pipeline, &[file], FilterKind::Sepia, None).unwrap();
        assert!(matches!(
            &reports[0].outcome,
            ReportOutcome::Ok { output: None, .. }
        ));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
