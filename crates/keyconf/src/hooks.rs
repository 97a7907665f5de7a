//! Decode hooks and their composition
//!
//! A hook sees every raw value on its way into a destination field together
//! with the field's static type, and either leaves it alone, replaces it, or
//! fails the decode. Hooks in a [`HookChain`] are tried in order and the first
//! one that does not pass through decides the outcome.
//!
//! The built-in hooks run before any caller-supplied ones:
//!
//! 1. [`DurationHook`] - `"1h30m"` or integer nanoseconds into `std::time::Duration`
//! 2. [`LenientScalarHook`] - strings, numbers and booleans into each other

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Number, Value, json};

use crate::duration::parse_duration;
use crate::kind::{TargetType, ValueKind};

/// What a hook decided for one value.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// The hook does not apply; the next hook is consulted.
    Passthrough,
    /// Decode this value instead of the original.
    Transformed(Value),
    /// Abort the decode with this message.
    Failed(String),
}

/// A type-coercion step applied while decoding.
///
/// Implemented for any `Fn(ValueKind, &TargetType, &Value) -> HookOutcome`
/// closure that is `Send + Sync`.
pub trait DecodeHook: Send + Sync {
    fn decode(&self, from: ValueKind, to: &TargetType, data: &Value) -> HookOutcome;
}

impl<F> DecodeHook for F
where
    F: Fn(ValueKind, &TargetType, &Value) -> HookOutcome + Send + Sync,
{
    fn decode(&self, from: ValueKind, to: &TargetType, data: &Value) -> HookOutcome {
        self(from, to, data)
    }
}

/// A shared, type-erased decode hook.
pub type Hook = Arc<dyn DecodeHook>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(ValueKind, &TargetType, &Value) -> HookOutcome + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The hooks every configuration starts with.
pub fn builtin_hooks() -> Vec<Hook> {
    vec![Arc::new(DurationHook), Arc::new(LenientScalarHook)]
}

/// Ordered hooks composed into a single first-match-wins step.
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Hook>,
}

impl HookChain {
    pub fn new(hooks: Vec<Hook>) -> Self {
        Self { hooks }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run the chain for one value headed into a field of type `to`.
    pub fn apply(&self, to: &TargetType, data: &Value) -> HookOutcome {
        let from = ValueKind::of(data);
        for hook in &self.hooks {
            match hook.decode(from, to, data) {
                HookOutcome::Passthrough => continue,
                outcome => return outcome,
            }
        }
        HookOutcome::Passthrough
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Decodes `std::time::Duration` from literals (`5s`, `1h30m`) or from
/// non-negative integers, which count nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationHook;

impl DecodeHook for DurationHook {
    fn decode(&self, from: ValueKind, to: &TargetType, data: &Value) -> HookOutcome {
        if !to.is_duration() {
            return HookOutcome::Passthrough;
        }

        let parsed = match (from, data) {
            (ValueKind::String, Value::String(literal)) => parse_duration(literal).ok(),
            (ValueKind::Number, Value::Number(n)) => n.as_u64().map(Duration::from_nanos),
            _ => return HookOutcome::Passthrough,
        };

        match parsed {
            Some(duration) => HookOutcome::Transformed(json!({
                "secs": duration.as_secs(),
                "nanos": duration.subsec_nanos(),
            })),
            None => HookOutcome::Failed(format!(
                "unable to convert {} into a std::time::Duration",
                data.as_str().map_or_else(|| data.to_string(), str::to_string)
            )),
        }
    }
}

/// Converts between scalar kinds when the destination asks for a different one.
///
/// - string -> bool (`1`, `t`, `true`, `0`, `f`, `false`, any case), int, uint, float
/// - number or bool -> string
/// - bool -> number (`1`/`0`), number -> bool (non-zero is `true`)
///
/// An empty string decodes as `false` or `0`. Strings that do not parse are
/// passed through, leaving them to later hooks or to the destination's own
/// type check.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientScalarHook;

impl DecodeHook for LenientScalarHook {
    fn decode(&self, from: ValueKind, to: &TargetType, data: &Value) -> HookOutcome {
        let converted = match (data, to) {
            (Value::String(s), TargetType::Bool) => parse_bool(s.trim()).map(Value::Bool),
            (Value::String(s), TargetType::Int) => {
                parse_number::<i64>(s.trim()).map(|i| Value::Number(i.into()))
            }
            (Value::String(s), TargetType::Uint) => {
                parse_number::<u64>(s.trim()).map(|u| Value::Number(u.into()))
            }
            (Value::String(s), TargetType::Float) => parse_number::<f64>(s.trim())
                .and_then(Number::from_f64)
                .map(Value::Number),
            (Value::Number(n), TargetType::Str) => Some(Value::String(n.to_string())),
            (Value::Bool(b), TargetType::Str) => Some(Value::String(b.to_string())),
            (Value::Bool(b), target) if target.is_number() => {
                Some(Value::Number(u64::from(*b).into()))
            }
            (Value::Number(n), TargetType::Bool) => {
                Some(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)))
            }
            _ => None,
        };

        match converted {
            Some(value) => HookOutcome::Transformed(value),
            None => {
                tracing::trace!(%from, %to, "Lenient scalar hook passing through");
                HookOutcome::Passthrough
            }
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr + Default>(s: &str) -> Option<T> {
    if s.is_empty() {
        return Some(T::default());
    }
    s.parse().ok()
}
