//! Source and destination type descriptors handed to decode hooks

use std::fmt;

use serde_json::Value;

/// The shape of a raw value in the parsed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Mapping,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// The static type a destination field asks for while it is being decoded.
///
/// Derived from the serde data model call the destination's `Deserialize`
/// implementation makes, so struct and enum names are the Rust type names
/// (`Duration` for `std::time::Duration`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    /// Self-describing; the destination accepts whatever is present.
    Any,
    Bool,
    /// Any signed integer width.
    Int,
    /// Any unsigned integer width.
    Uint,
    Float,
    Char,
    Str,
    Bytes,
    Option,
    Unit,
    UnitStruct(&'static str),
    Newtype(&'static str),
    Seq,
    Tuple(usize),
    TupleStruct {
        name: &'static str,
        len: usize,
    },
    Map,
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Enum {
        name: &'static str,
        variants: &'static [&'static str],
    },
    Identifier,
}

impl TargetType {
    /// Whether this is `std::time::Duration`.
    pub fn is_duration(&self) -> bool {
        matches!(
            self,
            TargetType::Struct { name: "Duration", fields } if *fields == ["secs", "nanos"]
        )
    }

    /// Whether a value of this type holds addressable members: a struct, map,
    /// sequence or tuple. `Any` counts, since self-describing types accept
    /// whatever shape is present.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TargetType::Any
                | TargetType::Seq
                | TargetType::Tuple(_)
                | TargetType::TupleStruct { .. }
                | TargetType::Map
                | TargetType::Struct { .. }
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TargetType::Int | TargetType::Uint | TargetType::Float)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Any => f.write_str("any"),
            TargetType::Bool => f.write_str("bool"),
            TargetType::Int => f.write_str("int"),
            TargetType::Uint => f.write_str("uint"),
            TargetType::Float => f.write_str("float"),
            TargetType::Char => f.write_str("char"),
            TargetType::Str => f.write_str("string"),
            TargetType::Bytes => f.write_str("bytes"),
            TargetType::Option => f.write_str("option"),
            TargetType::Unit => f.write_str("unit"),
            TargetType::Seq | TargetType::Tuple(_) => f.write_str("sequence"),
            TargetType::Map => f.write_str("map"),
            TargetType::Identifier => f.write_str("identifier"),
            TargetType::UnitStruct(name)
            | TargetType::Newtype(name)
            | TargetType::TupleStruct { name, .. }
            | TargetType::Struct { name, .. }
            | TargetType::Enum { name, .. } => f.write_str(name),
        }
    }
}
