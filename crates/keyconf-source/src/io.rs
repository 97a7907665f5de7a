//! Reading configuration content into a tree

use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::{Error, Format, Result};

/// Read and parse a configuration file.
///
/// The file handle is closed before this function returns.
pub fn read_file(path: &Path, format: Format) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    format.parse(&content)
}

/// Read a stream to its end and parse it.
pub fn read_stream<R: Read>(mut reader: R, format: Format) -> Result<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content).map_err(Error::Stream)?;
    format.parse(&content)
}
