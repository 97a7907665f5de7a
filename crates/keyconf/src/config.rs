//! The loaded configuration handle

use keyconf_source::{leaf_keys, lookup, section_keys};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode::{decode, requested_type};
use crate::error::{Error, Result};
use crate::hooks::HookChain;
use crate::loader;
use crate::options::{ConfigOption, Options};

/// A parsed configuration tree plus the hooks used to decode it.
///
/// Immutable once built; share it freely across threads.
#[derive(Debug, Clone)]
pub struct Config {
    tree: Value,
    hooks: HookChain,
}

impl Config {
    /// Resolve `options`, then read and parse the selected source.
    ///
    /// # Errors
    ///
    /// [`Error::SourceRead`] when the stream or file cannot be read or parsed,
    /// or no file matches on the search path.
    pub fn init<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut options = Options::resolve(options);
        let tree = loader::load(&mut options)?;
        let hooks = HookChain::new(std::mem::take(&mut options.hooks));
        tracing::debug!(hooks = hooks.len(), "Composed decode hooks");

        Ok(Self { tree, hooks })
    }

    /// Like [`Config::init`], but panics with the error message on failure.
    pub fn must_init<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        match Self::init(options) {
            Ok(config) => config,
            Err(err) => panic!("{err}"),
        }
    }

    /// Decode the sub-tree at `key` into `destination`.
    ///
    /// A fresh `T` is decoded from the sub-tree alone, so hooks only ever see
    /// values from the configuration. Fields the sub-tree does not mention
    /// take their `#[serde(default)]`. A missing or null `key` leaves
    /// `destination` untouched, and so does any error.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTarget`] if `T` is not a struct, map or sequence
    /// - [`Error::TypeCoercion`] if a hook rejects a value
    /// - [`Error::Decode`] if the sub-tree does not fit `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str, destination: &mut T) -> Result<()> {
        if !requested_type::<T>().is_container() {
            return Err(Error::InvalidTarget {
                expected: "struct or map",
                actual: std::any::type_name::<T>(),
            });
        }

        let section = lookup(&self.tree, key).filter(|value| !value.is_null());
        tracing::trace!(key, present = section.is_some(), "Decoding config section");
        let Some(section) = section else {
            return Ok(());
        };

        *destination = decode(section.clone(), key, &self.hooks)?;
        Ok(())
    }

    /// Top-level keys that hold nested keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        section_keys(&self.tree)
    }

    /// Every fully-qualified leaf key, lowercased and sorted.
    pub fn all_keys(&self) -> Vec<String> {
        leaf_keys(&self.tree)
    }

    /// Whether `key` resolves to a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        lookup(&self.tree, key).is_some_and(|value| !value.is_null())
    }

    /// The parsed tree, as read from the source.
    pub fn tree(&self) -> &Value {
        &self.tree
    }
}
