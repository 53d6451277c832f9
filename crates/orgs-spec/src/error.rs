//! Error types for orgs-spec

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} spec at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported spec format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Spec file too large: {path} is {size} bytes (max {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Invalid spec at {path}: {}", issues.join("; "))]
    Invalid { path: PathBuf, issues: Vec<String> },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
