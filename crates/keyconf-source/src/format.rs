//! Format selection and parsing into a generic tree
//!
//! Every grammar is normalized to a [`serde_json::Value`] whose root is an
//! object. Non-string YAML mapping keys are stringified so that all keys in the
//! tree are addressable by dotted key paths.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::{Error, Result};

/// A configuration grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Select a format from a file extension or format name.
    ///
    /// - `yaml`, `yml` -> YAML
    /// - `json` -> JSON
    /// - `toml` -> TOML
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Parse `content` into a tree rooted at a mapping.
    pub fn parse(&self, content: &str) -> Result<Value> {
        let tree = match self {
            Format::Yaml => parse_yaml(content)?,
            Format::Json => serde_json::from_str(content).map_err(|e| Error::parse(*self, e))?,
            Format::Toml => {
                let table: toml::Table = content.parse().map_err(|e| Error::parse(*self, e))?;
                toml_to_tree(toml::Value::Table(table))
            }
        };

        match tree {
            Value::Object(_) => Ok(tree),
            Value::Null => Ok(Value::Object(Map::new())),
            other => Err(Error::parse(
                *self,
                format!("top-level value must be a mapping, found {}", kind_name(&other)),
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "YAML"),
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

fn parse_yaml(content: &str) -> Result<Value> {
    // An empty document is an empty configuration, not an error.
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }

    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| Error::parse(Format::Yaml, e))?;
    yaml.apply_merge().map_err(|e| Error::parse(Format::Yaml, e))?;
    yaml_to_tree(yaml)
}

fn yaml_to_tree(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_tree)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_tree(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_tree(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else {
        float_value(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        _ => Err(Error::parse(Format::Yaml, "mapping keys must be scalars")),
    }
}

fn toml_to_tree(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => float_value(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_tree).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_tree(value)))
                .collect(),
        ),
    }
}

/// JSON numbers cannot hold NaN or infinities; those are kept as their
/// textual form so numeric decoding can still parse them.
fn float_value(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
