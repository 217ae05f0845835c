use crate::config::PipelineConfig;
use crate::constants::{INFO_PREFIX, PROGRESS_BAR_TEMPLATE, SUCCESS_PREFIX, WARNING_PREFIX};
use crate::error::{IngestError, Result};
use crate::record::{RecordParser, UploadBatch};
use crate::scanner::{FileEntry, FileScanner};
use crate::transform::{ImageAsset, ImageTransformer};
use crate::upload::{UploadClient, UploadResult};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// One pass of the onboarding workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resize and re-encode source images next to the originals.
    Convert,
    /// Upload every converted image, one request per file.
    UploadImages,
    /// Parse descriptor files and upload them as one JSON batch.
    UploadDescriptions,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Convert, Stage::UploadImages, Stage::UploadDescriptions];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    ProcessingItems,
    Uploading,
    Done,
    Failed,
}

/// Counters for a stage or a whole run. Pure accumulation, so the totals do
/// not depend on the order items finished in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items converted or parsed successfully.
    pub processed: usize,
    /// Items dropped on a decode, encode, schema or I/O error.
    pub skipped: usize,
    pub uploads: Vec<UploadResult>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.uploads.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.uploads.len() - self.succeeded()
    }

    pub fn absorb(&mut self, other: RunSummary) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.uploads.extend(other.uploads);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Run summary:", INFO_PREFIX)?;
        writeln!(f, "  {} Processed: {}", SUCCESS_PREFIX, self.processed)?;
        writeln!(f, "  {}  Skipped: {}", WARNING_PREFIX, self.skipped)?;
        write!(
            f,
            "  📤 Uploads: {} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        )
    }
}

/// Drives scan → transform/parse → upload for one configuration.
///
/// Per-item faults are logged and counted; only a missing root directory or
/// a failed batch upload ends a run early.
pub struct PipelineRunner {
    config: PipelineConfig,
    transformer: ImageTransformer,
    parser: RecordParser,
    client: UploadClient,
    state: RunState,
    show_progress: bool,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let transformer = ImageTransformer::new(&config);
        let parser = RecordParser::new(config.output_format.extension());
        let client = UploadClient::new(&config.upload)?;

        Ok(Self {
            config,
            transformer,
            parser,
            client,
            state: RunState::Idle,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the given stages in order and returns the combined summary.
    /// The runner only reaches [`RunState::Done`] once every stage has finished.
    pub fn run(&mut self, stages: &[Stage]) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        for stage in stages {
            info!("Starting stage {:?}", stage);
            let outcome = match stage {
                Stage::Convert => self.convert_images(),
                Stage::UploadImages => self.upload_images(),
                Stage::UploadDescriptions => self.upload_descriptions(),
            };
            match outcome {
                Ok(stage_summary) => summary.absorb(stage_summary),
                Err(e) => {
                    warn!("Run aborted during {:?}, completed so far:\n{}", stage, summary);
                    return Err(e);
                }
            }
        }

        self.set_state(RunState::Done);
        debug!(elapsed = ?start_time.elapsed(), "Run finished");
        Ok(summary)
    }

    pub fn convert_images(&mut self) -> Result<RunSummary> {
        let extension = self.config.image_extension.clone();
        let scanner = self.scan(&self.config.images_dir(), &extension)?;
        let entries: Vec<FileEntry> = scanner.entries().collect();
        info!(
            "Found {} .{} files under {:?}",
            entries.len(),
            extension.trim_start_matches('.'),
            scanner.root()
        );

        self.set_state(RunState::ProcessingItems);
        let progress = self.progress_bar(entries.len());
        let transformer = &self.transformer;

        let convert_one = |entry: &FileEntry| -> Result<()> {
            let result = transformer.convert(entry);
            progress.suspend(|| log_conversion(entry, &result));
            progress.inc(1);
            result.map(|_| ())
        };

        let results: Vec<Result<()>> = if self.config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
                .map_err(|e| IngestError::Unexpected(format!("Failed to build thread pool: {}", e)))?;
            pool.install(|| entries.par_iter().map(convert_one).collect())
        } else {
            entries.iter().map(convert_one).collect()
        };
        progress.finish_and_clear();

        let processed = results.iter().filter(|r| r.is_ok()).count();
        let summary = RunSummary {
            processed,
            skipped: results.len() - processed,
            uploads: Vec::new(),
        };
        info!(
            "Conversion complete: {} converted, {} skipped",
            summary.processed, summary.skipped
        );
        Ok(summary)
    }

    pub fn upload_images(&mut self) -> Result<RunSummary> {
        let extension = self.config.output_format.extension();
        let scanner = self.scan(&self.config.images_dir(), extension)?;

        self.set_state(RunState::Uploading);
        let mut summary = RunSummary::default();
        for entry in scanner.entries() {
            let attempt = self.client.upload_file(&entry.path);
            let result = UploadResult::from_attempt(entry.file_name(), &attempt);
            if result.is_success() {
                info!("{}", result);
            } else {
                warn!("{}", result);
            }
            summary.uploads.push(result);
        }

        info!(
            "Upload complete! {} successful, {} failed.",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Parses every descriptor into an ordered batch without uploading.
    pub fn collect_records(&mut self) -> Result<(UploadBatch, RunSummary)> {
        let extension = self.config.text_extension.clone();
        let scanner = self.scan(&self.config.descriptions_dir(), &extension)?;

        self.set_state(RunState::ProcessingItems);
        let mut batch = UploadBatch::new();
        let mut summary = RunSummary::default();

        for entry in scanner.entries() {
            match self.parser.parse_file(&entry) {
                Ok(record) => {
                    debug!(file = %entry.file_name(), name = %record.name, "Parsed descriptor");
                    batch.push(record);
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!("Error processing {}: {}", entry.file_name(), e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Parsed {} descriptors, skipped {}",
            summary.processed, summary.skipped
        );
        Ok((batch, summary))
    }

    /// Collects the batch and sends it in a single request. A failed request
    /// fails the run: there is no per-record outcome to fall back on.
    pub fn upload_descriptions(&mut self) -> Result<RunSummary> {
        let (batch, mut summary) = self.collect_records()?;

        if batch.is_empty() {
            warn!("No valid descriptors found, nothing to upload");
            return Ok(summary);
        }

        self.set_state(RunState::Uploading);
        let item_id = format!("batch of {} records", batch.len());
        match self.client.upload_batch(&batch) {
            Ok(status) => {
                info!("Upload successful! Status code: {}", status);
                summary
                    .uploads
                    .push(UploadResult::from_attempt(item_id, &Ok(status)));
                Ok(summary)
            }
            Err(e) => {
                error!("Error uploading data: {}", e);
                self.set_state(RunState::Failed);
                Err(e)
            }
        }
    }

    fn scan(&mut self, root: &Path, extension: &str) -> Result<FileScanner> {
        self.set_state(RunState::Scanning);
        match FileScanner::new(root, &[extension]) {
            Ok(scanner) => Ok(scanner.include_hidden(self.config.include_hidden)),
            Err(e) => {
                error!("{}", e);
                self.set_state(RunState::Failed);
                Err(e)
            }
        }
    }

    fn set_state(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn log_conversion(entry: &FileEntry, result: &Result<ImageAsset>) {
    match result {
        Ok(asset) => info!(
            "Converted: {} → {}",
            entry.file_name(),
            asset
                .output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ),
        Err(e @ (IngestError::Decode { .. } | IngestError::Encode { .. })) => {
            warn!("Cannot convert: {}: {}", entry.file_name(), e)
        }
        Err(e) => error!("Unexpected error processing {}: {}", entry.file_name(), e),
    }
}
