use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use supplier_ingest::cli::{Args, Commands};
use supplier_ingest::logger::{self, Verbosity};
use supplier_ingest::{PipelineConfig, PipelineRunner, RunSummary, Stage};
use tracing::error;

fn main() -> ExitCode {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    logger::init(verbosity);

    match run(args, verbosity) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, verbosity: Verbosity) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => PipelineConfig::default(),
    };

    let stages: &[Stage] = match &args.command {
        Commands::Convert { images } => {
            images.apply(&mut config);
            &[Stage::Convert]
        }
        Commands::UploadImages {
            dir,
            endpoint,
            timeout,
        } => {
            if let Some(dir) = dir {
                config.images_dir = dir.clone();
            }
            if let Some(endpoint) = endpoint {
                config.upload.images_endpoint = endpoint.clone();
            }
            if let Some(timeout) = timeout {
                config.upload.timeout_secs = *timeout;
            }
            &[Stage::UploadImages]
        }
        Commands::UploadDescriptions {
            dir,
            endpoint,
            timeout,
            dry_run,
        } => {
            if let Some(dir) = dir {
                config.descriptions_dir = dir.clone();
            }
            if let Some(endpoint) = endpoint {
                config.upload.descriptions_endpoint = endpoint.clone();
            }
            if let Some(timeout) = timeout {
                config.upload.timeout_secs = *timeout;
            }
            if *dry_run {
                return preview_descriptions(config);
            }
            &[Stage::UploadDescriptions]
        }
        Commands::Run {
            images,
            descriptions_dir,
        } => {
            images.apply(&mut config);
            if let Some(dir) = descriptions_dir {
                config.descriptions_dir = dir.clone();
            }
            &Stage::ALL
        }
    };

    let mut runner = PipelineRunner::new(config)
        .context("Invalid configuration")?
        .with_progress(verbosity != Verbosity::Quiet);
    let summary = runner.run(stages).context("Run aborted")?;

    print_summary(&summary);
    Ok(())
}

fn preview_descriptions(config: PipelineConfig) -> Result<()> {
    let mut runner = PipelineRunner::new(config).context("Invalid configuration")?;
    let (batch, summary) = runner.collect_records().context("Run aborted")?;

    println!("{}", batch.to_json()?);
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", summary);
}
