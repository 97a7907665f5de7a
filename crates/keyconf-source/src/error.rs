//! Error types for keyconf-source

use std::path::PathBuf;

use crate::Format;

/// Result type for keyconf-source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or parsing a configuration source
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error reading config stream: {0}")]
    Stream(#[source] std::io::Error),

    #[error("Failed to parse {format} config: {message}")]
    Parse { format: Format, message: String },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("{file_name} not found in any of {paths:?}")]
    NotFound {
        file_name: String,
        paths: Vec<String>,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(format: Format, message: impl ToString) -> Self {
        Self::Parse {
            format,
            message: message.to_string(),
        }
    }
}
