use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the recording engine
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The microphone buffer held no samples, nothing should be written
    #[error("Audio buffer is empty")]
    EmptyAudio,

    /// A collaborator the operation needs was never bound
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Directory creation or file write failed
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Point cloud, mesh and answers were already written for this session
    #[error("Session for {0} was already exported")]
    AlreadyExported(String),

    /// Point cloud or questionnaire rows could not be serialized
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Caller handed over malformed data (bad triangle list, index out of range)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RecorderError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
