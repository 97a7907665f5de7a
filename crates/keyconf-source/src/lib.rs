//! Configuration sources for keyconf
//!
//! Locates a named configuration file across an ordered list of directories,
//! parses YAML, JSON or TOML into a generic [`serde_json::Value`] tree, and
//! offers key-path helpers over that tree.

pub mod error;
pub mod format;
pub mod io;
pub mod probe;
pub mod tree;

pub use error::{Error, Result};
pub use format::Format;
pub use io::{read_file, read_stream};
pub use probe::find_config_file;
pub use tree::{get_ignore_case, leaf_keys, lookup, section_keys};
