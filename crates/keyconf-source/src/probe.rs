//! Ordered directory probing for a named configuration file

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Search `paths` in order for a file named `<name>.<extension>`.
///
/// The first directory containing a regular file with that name wins; later
/// directories are not consulted.
pub fn find_config_file(name: &str, extension: &str, paths: &[String]) -> Result<PathBuf> {
    let file_name = format!("{name}.{extension}");

    for dir in paths {
        let candidate = Path::new(dir).join(&file_name);
        let found = candidate.is_file();
        tracing::debug!(?candidate, found, "Probing for config file");
        if found {
            return Ok(candidate);
        }
    }

    Err(Error::NotFound {
        file_name,
        paths: paths.to_vec(),
    })
}
