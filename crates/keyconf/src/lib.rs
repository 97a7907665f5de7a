//! Keyconf
//!
//! Load one YAML, JSON or TOML configuration source and decode named sections
//! of it into typed values.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use keyconf::{Config, options};
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize)]
//! #[serde(default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     timeout: Duration,
//! }
//!
//! let config = Config::init([
//!     options::name("app"),
//!     options::paths(["/etc/app", "."]),
//! ])?;
//!
//! let mut server = Server::default();
//! config.get("server", &mut server)?;
//! # Ok::<(), keyconf::Error>(())
//! ```
//!
//! Values pass through a chain of decode hooks on their way into the
//! destination. The built-in hooks turn duration literals such as `"1h30m"`
//! into [`std::time::Duration`] and convert between scalar kinds; further
//! hooks can be appended with [`options::hooks`].

pub mod config;
pub mod decode;
pub mod duration;
pub mod error;
pub mod hooks;
pub mod kind;
mod loader;
pub mod options;

pub use config::Config;
pub use duration::{DurationError, parse_duration};
pub use error::{Error, Result, SourceOrigin};
pub use hooks::{
    DecodeHook, DurationHook, Hook, HookChain, HookOutcome, LenientScalarHook, builtin_hooks,
    hook,
};
pub use kind::{TargetType, ValueKind};
pub use options::{ConfigOption, Options};
