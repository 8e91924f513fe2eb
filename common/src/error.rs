use std::path::PathBuf;

use thiserror::Error;

/// Exit status for a results file that is not valid JSON.
pub const EXIT_INVALID_JSON: u8 = 2;
/// Exit status for any other failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Printed on its own, so the parse error is part of the message.
    #[error("Invalid JSON file {}: {error}", path.display())]
    InvalidJson {
        path: PathBuf,
        error: serde_json::Error,
    },
    #[error("Unexpected results layout in {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Key {key:?} is not of the form {expected}")]
    MalformedKey { key: String, expected: &'static str },
    #[error("Missing {key} in {within}")]
    MissingKey { key: String, within: String },
    #[error("No {0} in results file")]
    UnknownPattern(String),
    #[error("Invalid chart settings: {0}")]
    Settings(String),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("Cannot access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// Splits a serde_json failure into a syntax problem or a schema mismatch.
    pub fn from_json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        let path = path.into();
        if source.is_syntax() || source.is_eof() {
            ReportError::InvalidJson {
                path,
                error: source,
            }
        } else {
            ReportError::Decode { path, source }
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::InvalidJson { .. } => EXIT_INVALID_JSON,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
