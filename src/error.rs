use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the preprocessing pass.
///
/// Every condition is terminal: the consuming solver cannot recover from a
/// malformed initializer or parameter file, so nothing here is retried.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("raster arrays disagree in shape: {0}")]
    ShapeMismatch(String),

    #[error("failed to read raster source {path}: {detail}")]
    SourceRead { path: PathBuf, detail: String },

    #[error("failed to write {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrepError {
    pub fn source_read(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        PrepError::SourceRead {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PrepError::OutputWrite {
            path: path.into(),
            source,
        }
    }
}
