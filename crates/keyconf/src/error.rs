//! Error types for keyconf

use std::fmt;

/// Result type for keyconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`Config::init`](crate::Config::init) and
/// [`Config::get`](crate::Config::get)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream or file could not be located or parsed.
    #[error("failed to read {origin}")]
    SourceRead {
        origin: SourceOrigin,
        #[source]
        source: keyconf_source::Error,
    },

    /// A decode hook rejected a raw value.
    #[error("error decoding '{path}': {message}")]
    TypeCoercion { path: String, message: String },

    /// The tree does not have the shape the destination expects.
    #[error("error decoding '{path}': {message}")]
    Decode { path: String, message: String },

    /// The destination is not an addressable container.
    #[error("expected a {expected} but got {actual}")]
    InvalidTarget {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Where a configuration tree was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// A caller-provided stream in the given format.
    Reader { extension: String },
    /// A named file searched for across ordered directories.
    Search {
        file_name: String,
        paths: Vec<String>,
    },
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::Reader { extension } => write!(f, "{extension} config from io reader"),
            SourceOrigin::Search { file_name, paths } => {
                write!(f, "{file_name} from [{}]", paths.join(" "))
            }
        }
    }
}
