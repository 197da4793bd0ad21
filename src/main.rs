use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tee_preview::config;
use tee_preview::files::{self, FileUpload};
use tee_preview::imaging::{FilterKind, RustBackend};
use tee_preview::output::{self, IngestReport, ReportOutcome};
use tee_preview::pipeline::{Pipeline, PipelineError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tee-preview")]
#[command(about = "Validate, resize and filter images for t-shirt design previews")]
#[command(long_about = "\
Validate, resize and filter images for t-shirt design previews

Each image goes through:

  validate → decode → resize (fit 800x800) → filter → encode (JPEG 0.85)

Accepted inputs are JPEG, PNG, GIF and WebP up to 5 MiB. Filters:
normal, grayscale, sepia, vintage, bright.

Run 'tee-preview gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults apply when it does not exist)
    #[arg(long, default_value = "tee-preview.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn one image into a preview JPEG
    Ingest {
        /// Image file to process
        file: PathBuf,
        /// Filter to apply
        #[arg(long, default_value_t = FilterKind::Normal)]
        filter: FilterKind,
        /// Where to write the JPEG (default: <stem>-<filter>.jpg)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print a data URL to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        data_url: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode once and render every filter
    Filters {
        /// Image file to process
        file: PathBuf,
        /// Directory for the <stem>-<filter>.jpg outputs
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Process several images in parallel
    Batch {
        /// Image files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Filter to apply to every image
        #[arg(long, default_value_t = FilterKind::Normal)]
        filter: FilterKind,
        /// Directory for the <stem>-<filter>.jpg outputs (omit for a dry run)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tee_preview=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let app_config = config::load_config(&cli.config)?;
    tracing::debug!(config = %cli.config.display(), ?app_config, "config loaded");
    init_thread_pool(&app_config.processing);
    let pipeline = Pipeline::with_backend(RustBackend::new(), app_config.limits);

    match cli.command {
        Command::Ingest {
            file,
            filter,
            output,
            data_url,
            json,
        } => {
            let FileUpload {
                media_type,
                size,
                upload,
            } = files::read_upload(&file, pipeline.limits())?;
            let report = |outcome| IngestReport {
                source: file.display().to_string(),
                media_type: media_type.to_string(),
                upload_bytes: size,
                outcome,
            };

            let ingested = match upload
                .map_err(PipelineError::from)
                .and_then(|upload| pipeline.ingest_with_filter(upload, filter))
            {
                Ok(ingested) => ingested,
                Err(e) => {
                    emit_report(&report(ReportOutcome::failed(&e)), json)?;
                    return Err(e.into());
                }
            };

            if data_url {
                println!("{}", ingested.image.to_data_url());
                return Ok(());
            }

            let target =
                output.unwrap_or_else(|| files::output_path(Path::new("."), &file, filter));
            files::write_image(&target, &ingested.image)?;
            let outcome = ReportOutcome::ok(&ingested, filter, Some(&target));
            emit_report(&report(outcome), json)?;
        }
        Command::Filters { file, output_dir } => {
            let upload = files::read_upload(&file, pipeline.limits())?
                .upload
                .map_err(PipelineError::from)?;
            let ingested = pipeline.ingest(upload)?;
            std::fs::create_dir_all(&output_dir)?;

            let mut written = Vec::new();
            for kind in FilterKind::ALL {
                let image = pipeline.reapply_filter(&ingested.resized, kind)?;
                let target = files::output_path(&output_dir, &file, kind);
                files::write_image(&target, &image)?;
                written.push((kind, target.display().to_string()));
            }
            output::print_filter_outputs(&written);
        }
        Command::Batch {
            files: inputs,
            filter,
            output_dir,
            json,
        } => {
            if let Some(dir) = &output_dir {
                std::fs::create_dir_all(dir)?;
            }

            let reports = files::ingest_files(&pipeline, &inputs, filter, output_dir.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                output::print_batch_output(&reports);
            }

            let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
            if failed > 0 {
                return Err(format!("{failed} of {} images failed", reports.len()).into());
            }
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn emit_report(report: &IngestReport, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        output::print_ingest_report(report);
    }
    Ok(())
}
