//! Option resolution for [`Config::init`](crate::Config::init)
//!
//! Options are applied in order over the defaults. An option carrying an
//! empty value (empty string, empty list, no reader) leaves its field alone,
//! so callers can build option lists conditionally. Hooks accumulate; every
//! other option overwrites.

use std::fmt;
use std::io::Read;

use crate::hooks::{Hook, builtin_hooks};

/// Default configuration file name, without extension
pub const DEFAULT_NAME: &str = "config";

/// Default format
pub const DEFAULT_EXTENSION: &str = "yaml";

/// Default search path
pub const DEFAULT_PATH: &str = ".";

/// One change to the effective [`Options`].
pub enum ConfigOption {
    Name(String),
    Extension(String),
    Paths(Vec<String>),
    Reader(Option<Box<dyn Read>>),
    Hooks(Vec<Hook>),
}

impl ConfigOption {
    fn apply(self, options: &mut Options) {
        match self {
            ConfigOption::Name(name) if !name.is_empty() => options.name = name,
            ConfigOption::Extension(extension) if !extension.is_empty() => {
                options.extension = extension
            }
            ConfigOption::Paths(paths) if !paths.is_empty() => options.paths = paths,
            ConfigOption::Reader(Some(reader)) => options.reader = Some(reader),
            ConfigOption::Hooks(hooks) => options.hooks.extend(hooks),
            _ => {}
        }
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOption::Name(name) => f.debug_tuple("Name").field(name).finish(),
            ConfigOption::Extension(ext) => f.debug_tuple("Extension").field(ext).finish(),
            ConfigOption::Paths(paths) => f.debug_tuple("Paths").field(paths).finish(),
            ConfigOption::Reader(reader) => f
                .debug_tuple("Reader")
                .field(&reader.as_ref().map(|_| ".."))
                .finish(),
            ConfigOption::Hooks(hooks) => f.debug_tuple("Hooks").field(&hooks.len()).finish(),
        }
    }
}

/// Set the configuration file name to search for (without extension).
pub fn name(name: impl Into<String>) -> ConfigOption {
    ConfigOption::Name(name.into())
}

/// Set the format, which is also the file extension searched for.
pub fn extension(extension: impl Into<String>) -> ConfigOption {
    ConfigOption::Extension(extension.into())
}

/// Set the directories searched, in order, for the configuration file.
pub fn paths<I, S>(paths: I) -> ConfigOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ConfigOption::Paths(paths.into_iter().map(Into::into).collect())
}

/// Read the configuration from a stream instead of searching for a file.
pub fn reader<R: Read + 'static>(reader: R) -> ConfigOption {
    ConfigOption::Reader(Some(Box::new(reader)))
}

/// Append decode hooks after the built-in ones.
pub fn hooks<I>(hooks: I) -> ConfigOption
where
    I: IntoIterator<Item = Hook>,
{
    ConfigOption::Hooks(hooks.into_iter().collect())
}

/// The effective configuration descriptor.
pub struct Options {
    pub(crate) name: String,
    pub(crate) extension: String,
    pub(crate) paths: Vec<String>,
    pub(crate) reader: Option<Box<dyn Read>>,
    pub(crate) hooks: Vec<Hook>,
}

impl Options {
    /// Apply `options` in order over the defaults.
    pub fn resolve<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut resolved = Self::default();
        for option in options {
            option.apply(&mut resolved);
        }
        resolved
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            paths: vec![DEFAULT_PATH.to_string()],
            reader: None,
            hooks: builtin_hooks(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("paths", &self.paths)
            .field("reader", &self.has_reader())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookOutcome, hook};
    use pretty_assertions::assert_eq;

    fn noop_hook() -> Hook {
        hook(|_, _, _| HookOutcome::Passthrough)
    }

    #[test]
    fn test_defaults() {
        let opt = Options::resolve(Vec::<ConfigOption>::new());
        assert_eq!(opt.name(), DEFAULT_NAME);
        assert_eq!(opt.extension(), DEFAULT_EXTENSION);
        assert_eq!(opt.paths(), [DEFAULT_PATH.to_string()]);
        assert!(!opt.has_reader());
        assert_eq!(opt.hooks().len(), builtin_hooks().len());
    }

    #[test]
    fn test_name_option() {
        let opt = Options::resolve([name("anotherName")]);
        assert_eq!(opt.name(), "anotherName");
    }

    #[test]
    fn test_name_option_when_empty() {
        let opt = Options::resolve([name("")]);
        assert_eq!(opt.name(), DEFAULT_NAME);
    }

    #[test]
    fn test_extension_option() {
        let opt = Options::resolve([extension("json")]);
        assert_eq!(opt.extension(), "json");
    }

    #[test]
    fn test_extension_option_when_empty() {
        let opt = Options::resolve([extension("")]);
        assert_eq!(opt.extension(), DEFAULT_EXTENSION);
    }

    #[test]
    fn test_paths_option() {
        let expected = vec!["/tmp", "/app", "/etc"];
        let opt = Options::resolve([paths(expected.clone())]);
        assert_eq!(opt.paths(), expected);
    }

    #[test]
    fn test_paths_option_when_empty() {
        let opt = Options::resolve([paths(Vec::<String>::new())]);
        assert_eq!(opt.paths(), [DEFAULT_PATH.to_string()]);
    }

    #[test]
    fn test_reader_option() {
        let opt = Options::resolve([reader(std::io::empty())]);
        assert!(opt.has_reader());
    }

    #[test]
    fn test_reader_option_when_none() {
        let opt = Options::resolve([ConfigOption::Reader(None)]);
        assert!(!opt.has_reader());
    }

    #[test]
    fn test_absent_reader_keeps_earlier_reader() {
        let opt = Options::resolve([reader(std::io::empty()), ConfigOption::Reader(None)]);
        assert!(opt.has_reader());
    }

    #[test]
    fn test_hooks_option_appends_after_builtins() {
        let opt = Options::resolve([hooks([noop_hook(), noop_hook(), noop_hook()])]);
        assert_eq!(opt.hooks().len(), 3 + builtin_hooks().len());
    }

    #[test]
    fn test_hooks_accumulate_across_options() {
        let opt = Options::resolve([hooks([noop_hook()]), hooks([noop_hook()])]);
        assert_eq!(opt.hooks().len(), 2 + builtin_hooks().len());
    }

    #[test]
    fn test_hooks_option_when_empty() {
        let opt = Options::resolve([hooks(Vec::new())]);
        assert_eq!(opt.hooks().len(), builtin_hooks().len());
    }

    #[test]
    fn test_later_options_overwrite_earlier() {
        let opt = Options::resolve([name("first"), name("second"), extension("toml")]);
        assert_eq!(opt.name(), "second");
        assert_eq!(opt.extension(), "toml");
    }
}
