use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Path not found or not a directory: {0}")]
    PathNotFound(PathBuf),

    #[error("Cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Cannot encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Invalid descriptor {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    #[error("Transport error for {target}: {reason}")]
    Transport { target: String, reason: String },

    #[error("Server rejected {target} with status {status}")]
    ServerRejected { target: String, status: u16 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl IngestError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IngestError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IngestError::Encode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IngestError::Schema {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path_and_reason() {
        let err = IngestError::schema("apple.txt", "missing weight line");
        assert_eq!(
            err.to_string(),
            "Invalid descriptor apple.txt: missing weight line"
        );
    }
}
