use crate::config::UploadConfig;
use crate::constants::UPLOAD_FIELD_NAME;
use crate::error::{IngestError, Result};
use crate::formats::OutputFormat;
use crate::record::UploadBatch;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::path::Path;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Outcome of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted(u16),
    Rejected(u16),
    Failed(String),
}

/// Per-item record of an upload, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub item_id: String,
    pub outcome: UploadOutcome,
}

impl UploadResult {
    pub fn from_attempt(item_id: impl Into<String>, attempt: &Result<u16>) -> Self {
        let outcome = match attempt {
            Ok(status) => UploadOutcome::Accepted(*status),
            Err(IngestError::ServerRejected { status, .. }) => UploadOutcome::Rejected(*status),
            Err(e) => UploadOutcome::Failed(e.to_string()),
        };
        Self {
            item_id: item_id.into(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Accepted(_))
    }
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            UploadOutcome::Accepted(status) => {
                write!(f, "Successfully uploaded: {} ({})", self.item_id, status)
            }
            UploadOutcome::Rejected(status) => write!(
                f,
                "Failed to upload {}: Server returned status code {}",
                self.item_id, status
            ),
            UploadOutcome::Failed(reason) => {
                write!(f, "Error uploading {}: {}", self.item_id, reason)
            }
        }
    }
}

/// HTTP client for the catalog service.
///
/// Requests are async underneath; the blocking methods drive them on a
/// private current-thread runtime so the pipeline can stay sequential.
pub struct UploadClient {
    client: Client,
    runtime: Runtime,
    images_endpoint: String,
    descriptions_endpoint: String,
}

impl UploadClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| IngestError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IngestError::Unexpected(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            client,
            runtime,
            images_endpoint: config.images_endpoint.clone(),
            descriptions_endpoint: config.descriptions_endpoint.clone(),
        })
    }

    /// Sends the whole batch as one JSON array. Any 2xx is success; anything
    /// else fails the batch as a whole.
    pub fn upload_batch(&self, batch: &UploadBatch) -> Result<u16> {
        self.runtime.block_on(self.upload_batch_async(batch))
    }

    /// Sends one file as multipart field `file`. Only 200 and 201 count as
    /// success.
    pub fn upload_file(&self, path: &Path) -> Result<u16> {
        self.runtime.block_on(self.upload_file_async(path))
    }

    pub async fn upload_batch_async(&self, batch: &UploadBatch) -> Result<u16> {
        let target = format!("batch of {} records", batch.len());
        debug!(endpoint = %self.descriptions_endpoint, records = batch.len(), "Posting JSON batch");

        let response = self
            .client
            .post(&self.descriptions_endpoint)
            .json(batch)
            .send()
            .await
            .map_err(|e| transport_error(&target, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(IngestError::ServerRejected {
                target,
                status: status.as_u16(),
            })
        }
    }

    pub async fn upload_file_async(&self, path: &Path) -> Result<u16> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| IngestError::Unexpected(format!("{:?} has no file name", path)))?;

        // Read fully before sending; the handle is closed when this returns.
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::io(path, e))?;

        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
            .map(|format| format.mime_type())
            .unwrap_or("application/octet-stream");

        let part = Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(mime)
            .map_err(|e| IngestError::Unexpected(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!(endpoint = %self.images_endpoint, file = %file_name, "Posting multipart upload");

        let response = self
            .client
            .post(&self.images_endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&file_name, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.status().as_u16()),
            status => Err(IngestError::ServerRejected {
                target: file_name,
                status: status.as_u16(),
            }),
        }
    }
}

fn transport_error(target: &str, error: reqwest::Error) -> IngestError {
    let reason = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else {
        error.to_string()
    };
    IngestError::Transport {
        target: target.to_string(),
        reason,
    }
}
