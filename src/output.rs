//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! ```text
//! dawn.png (image/png, 1.4 MiB)
//!     Decoded: 1600x1200
//!     Preview: 800x600 image/jpeg (62.3 KiB)
//!     Filter: sepia
//!     Output: dawn-sepia.jpg
//! ```

use crate::imaging::FilterKind;
use crate::pipeline::{FailedStage, Ingested, PipelineError};
use serde::Serialize;
use std::path::Path;

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub media_type: String,
    pub upload_bytes: u64,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportOutcome {
    Ok {
        original: (u32, u32),
        preview: (u32, u32),
        preview_bytes: usize,
        media_type: String,
        filter: FilterKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    Failed {
        stage: FailedStage,
        error: String,
    },
    /// The preview was rendered but writing it to `output` failed.
    Unwritten {
        preview: (u32, u32),
        filter: FilterKind,
        output: String,
        error: String,
    },
}

impl ReportOutcome {
    pub fn ok(ingested: &Ingested, filter: FilterKind, output: Option<&Path>) -> Self {
        ReportOutcome::Ok {
            original: ingested.original_dimensions,
            preview: ingested.image.dimensions(),
            preview_bytes: ingested.image.len(),
            media_type: ingested.image.media_type().to_string(),
            filter,
            output: output.map(|p| p.display().to_string()),
        }
    }

    pub fn failed(err: &PipelineError) -> Self {
        ReportOutcome::Failed {
            stage: err.stage(),
            error: err.to_string(),
        }
    }

    pub fn unwritten(
        ingested: &Ingested,
        filter: FilterKind,
        output: &Path,
        err: &std::io::Error,
    ) -> Self {
        ReportOutcome::Unwritten {
            preview: ingested.image.dimensions(),
            filter,
            output: output.display().to_string(),
            error: err.to_string(),
        }
    }

    /// True unless a preview was produced and, when asked for, written.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ReportOutcome::Ok { .. })
    }
}

/// Human-readable byte count: `512 B`, `3.2 KiB`, `1.4 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

pub fn format_ingest_report(report: &IngestReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}, {})",
        report.source,
        report.media_type,
        format_bytes(report.upload_bytes)
    )];

    match &report.outcome {
        ReportOutcome::Ok {
            original,
            preview,
            preview_bytes,
            media_type,
            filter,
            output,
        } => {
            lines.push(format!("{}Decoded: {}x{}", indent(1), original.0, original.1));
            lines.push(format!(
                "{}Preview: {}x{} {} ({})",
                indent(1),
                preview.0,
                preview.1,
                media_type,
                format_bytes(*preview_bytes as u64)
            ));
            lines.push(format!("{}Filter: {}", indent(1), filter));
            if let Some(path) = output {
                lines.push(format!("{}Output: {}", indent(1), path));
            }
        }
        ReportOutcome::Failed { stage, error } => {
            lines.push(format!("{}Failed at {}: {}", indent(1), stage, error));
        }
        ReportOutcome::Unwritten {
            preview,
            filter,
            output,
            error,
        } => {
            lines.push(format!("{}Preview: {}x{}", indent(1), preview.0, preview.1));
            lines.push(format!("{}Filter: {}", indent(1), filter));
            lines.push(format!("{}Write failed: {}: {}", indent(1), output, error));
        }
    }

    lines
}

pub fn print_ingest_report(report: &IngestReport) {
    for line in format_ingest_report(report) {
        println!("{}", line);
    }
}

/// Summary line for a batch run.
pub fn format_batch_summary(reports: &[IngestReport]) -> String {
    let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
    format!(
        "Processed {} image{}, {} failed",
        reports.len(),
        if reports.len() == 1 { "" } else { "s" },
        failed
    )
}

pub fn print_batch_output(reports: &[IngestReport]) {
    for report in reports {
        print_ingest_report(report);
    }
    println!("{}", format_batch_summary(reports));
}

/// One line per filter: `name → path`.
pub fn format_filter_outputs(outputs: &[(FilterKind, String)]) -> Vec<String> {
    outputs
        .iter()
        .map(|(kind, path)| format!("{:<10} → {}", kind.label(), path))
        .collect()
}

pub fn print_filter_outputs(outputs: &[(FilterKind, String)]) {
    for line in format_filter_outputs(outputs) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ValidationError;

    fn ok_report() -> IngestReport {
        IngestReport {
            source: "dawn.png".into(),
            media_type: "image/png".into(),
            upload_bytes: 1_500_000,
            outcome: ReportOutcome::Ok {
                original: (1600, 1200),
                preview: (800, 600),
                preview_bytes: 63_800,
                media_type: "image/jpeg".into(),
                filter: FilterKind::Sepia,
                output: Some("dawn-sepia.jpg".into()),
            },
        }
    }

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn ok_report_lines() {
        assert_eq!(
            format_ingest_report(&ok_report()),
            vec![
                "dawn.png (image/png, 1.4 MiB)",
                "    Decoded: 1600x1200",
                "    Preview: 800x600 image/jpeg (62.3 KiB)",
                "    Filter: sepia",
                "    Output: dawn-sepia.jpg",
            ]
        );
    }

    #[test]
    fn failed_report_names_stage() {
        let err = PipelineError::from(ValidationError::NotAnImage("text/plain".into()));
        let report = IngestReport {
            source: "notes.txt".into(),
            media_type: "text/plain".into(),
            upload_bytes: 12,
            outcome: ReportOutcome::failed(&err),
        };
        let lines = format_ingest_report(&report);
        assert_eq!(lines[0], "notes.txt (text/plain, 12 B)");
        assert!(lines[1].starts_with("    Failed at validate: Validation failed"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "validate");
    }

    #[test]
    fn report_json_is_tagged() {
        let json = serde_json::to_value(ok_report()).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["filter"], "sepia");
        assert_eq!(json["preview"][0], 800);
    }

    #[test]
    fn batch_summary_counts_failures() {
        let err = PipelineError::from(ValidationError::TooLarge { size: 9, limit: 1 });
        let failed = IngestReport {
            outcome: ReportOutcome::failed(&err),
            ..ok_report()
        };
        assert_eq!(
            format_batch_summary(&[ok_report(), failed]),
            "Processed 2 images, 1 failed"
        );
        assert_eq!(format_batch_summary(&[ok_report()]), "Processed 1 image, 0 failed");
    }

    #[test]
    fn unwritten_report_counts_as_failure() {
        let unwritten = IngestReport {
            outcome: ReportOutcome::Unwritten {
                preview: (800, 600),
                filter: FilterKind::Sepia,
                output: "out/dawn-sepia.jpg".into(),
                error: "Permission denied".into(),
            },
            ..ok_report()
        };
        assert_eq!(
            format_ingest_report(&unwritten)[1..].to_vec(),
            vec![
                "    Preview: 800x600",
                "    Filter: sepia",
                "    Write failed: out/dawn-sepia.jpg: Permission denied",
            ]
        );
        assert_eq!(
            format_batch_summary(&[ok_report(), unwritten.clone()]),
            "Processed 2 images, 1 failed"
        );
        assert_eq!(serde_json::to_value(&unwritten).unwrap()["status"], "unwritten");
    }

    #[test]
    fn filter_output_lines_use_labels() {
        let lines = format_filter_outputs(&[(FilterKind::Bright, "a-bright.jpg".into())]);
        assert_eq!(lines, vec!["Brighter   → a-bright.jpg"]);
    }
}
