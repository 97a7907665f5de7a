//! Source selection: a caller stream or the first matching file on the search path

use keyconf_source::{Format, find_config_file, read_file, read_stream};
use serde_json::Value;

use crate::error::{Error, Result, SourceOrigin};
use crate::options::Options;

/// Read and parse the configuration tree described by `options`.
///
/// A reader, when present, is consumed and dropped here; the file search is
/// skipped entirely in that case.
pub(crate) fn load(options: &mut Options) -> Result<Value> {
    match options.reader.take() {
        Some(reader) => {
            tracing::debug!(extension = %options.extension, "Reading config from stream");
            let format = Format::from_extension(&options.extension);
            format
                .and_then(|format| read_stream(reader, format))
                .map_err(|source| {
                    source_error(
                        SourceOrigin::Reader {
                            extension: options.extension.clone(),
                        },
                        source,
                    )
                })
        }
        None => search(options).map_err(|source| {
            source_error(
                SourceOrigin::Search {
                    file_name: format!("{}.{}", options.name, options.extension),
                    paths: options.paths.clone(),
                },
                source,
            )
        }),
    }
}

fn search(options: &Options) -> keyconf_source::Result<Value> {
    let format = Format::from_extension(&options.extension)?;
    let path = find_config_file(&options.name, &options.extension, &options.paths)?;
    tracing::debug!(?path, %format, "Reading config file");
    read_file(&path, format)
}

fn source_error(origin: SourceOrigin, source: keyconf_source::Error) -> Error {
    tracing::warn!(%origin, error = %source, "Config source unavailable");
    Error::SourceRead { origin, source }
}
