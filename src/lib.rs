pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod transform;
pub mod upload;

pub use config::{PipelineConfig, UploadConfig};
pub use error::{IngestError, Result};
pub use formats::{OutputFormat, ResampleFilter};
pub use pipeline::{PipelineRunner, RunState, RunSummary, Stage};
pub use record::{parse_weight, ProductRecord, RecordParser, UploadBatch, Weight};
pub use scanner::{FileEntry, FileScanner};
pub use transform::{ImageAsset, ImageTransformer};
pub use upload::{UploadClient, UploadOutcome, UploadResult};
