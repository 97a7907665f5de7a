//! Serde decoding of tree values with hook interception
//!
//! [`TreeDeserializer`] walks a [`Value`] on behalf of a destination's
//! `Deserialize` implementation. Every time the destination asks for a value
//! it names the type it expects; that request becomes a [`TargetType`] and
//! the hook chain gets a chance to coerce the raw value before it is visited.
//!
//! Struct fields and enum variants match tree keys case-insensitively, with an
//! exact match preferred.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess,
    SeqAccess, Unexpected, VariantAccess, Visitor,
};
use serde_json::{Map, Number, Value};

use crate::Error;
use crate::hooks::{HookChain, HookOutcome};
use crate::kind::TargetType;

/// Decode `value` into `T` through `hooks`, reporting errors relative to `path`.
pub fn decode<T: DeserializeOwned>(
    value: Value,
    path: &str,
    hooks: &HookChain,
) -> Result<T, Error> {
    T::deserialize(TreeDeserializer::new(value, path, hooks)).map_err(Error::from)
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("{message}")]
    Coercion { path: String, message: String },

    #[error("{message}")]
    Mismatch {
        path: Option<String>,
        message: String,
    },
}

impl DecodeError {
    /// Attach `path` unless a deeper value already claimed the error.
    fn at(self, path: &str) -> Self {
        match self {
            DecodeError::Mismatch {
                path: None,
                message,
            } => DecodeError::Mismatch {
                path: Some(path.to_string()),
                message,
            },
            other => other,
        }
    }
}

impl de::Error for DecodeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        DecodeError::Mismatch {
            path: None,
            message: msg.to_string(),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Coercion { path, message } => Error::TypeCoercion { path, message },
            DecodeError::Mismatch { path, message } => Error::Decode {
                path: path.unwrap_or_default(),
                message,
            },
        }
    }
}

pub(crate) struct TreeDeserializer<'h> {
    value: Value,
    path: String,
    hooks: &'h HookChain,
}

impl<'h> TreeDeserializer<'h> {
    pub(crate) fn new(value: Value, path: impl Into<String>, hooks: &'h HookChain) -> Self {
        Self {
            value,
            path: path.into(),
            hooks,
        }
    }

    fn coerce(mut self, target: TargetType) -> Result<Self, DecodeError> {
        match self.hooks.apply(&target, &self.value) {
            HookOutcome::Passthrough => Ok(self),
            HookOutcome::Transformed(value) => {
                self.value = value;
                Ok(self)
            }
            HookOutcome::Failed(message) => Err(DecodeError::Coercion {
                path: self.path,
                message,
            }),
        }
    }

    fn visit_any<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let Self { value, path, hooks } = self;
        let result = match value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => visit_number(&n, visitor),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visit_array(items, &path, hooks, visitor),
            Value::Object(map) => visitor.visit_map(MapDeserializer::new(map, None, &path, hooks)),
        };
        result.map_err(|e| e.at(&path))
    }

    fn visit_sequence<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let Self { value, path, hooks } = self;
        let result = match value {
            Value::Array(items) => visit_array(items, &path, hooks, visitor),
            Value::Null => visit_array(Vec::new(), &path, hooks, visitor),
            other => return Err(invalid_type(&other, &visitor, &path)),
        };
        result.map_err(|e| e.at(&path))
    }

    fn visit_mapping<'de, V: Visitor<'de>>(
        self,
        fields: Option<&'static [&'static str]>,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let Self { value, path, hooks } = self;
        let result = match value {
            Value::Object(map) => visitor.visit_map(MapDeserializer::new(map, fields, &path, hooks)),
            Value::Null => visitor.visit_map(MapDeserializer::new(Map::new(), fields, &path, hooks)),
            other => return Err(invalid_type(&other, &visitor, &path)),
        };
        result.map_err(|e| e.at(&path))
    }

    fn visit_unit_value<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::Null => visitor
                .visit_unit::<DecodeError>()
                .map_err(|e| e.at(&self.path)),
            other => Err(invalid_type(&other, &visitor, &self.path)),
        }
    }
}

macro_rules! deserialize_coerced {
    ($($method:ident => $target:expr,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                self.coerce($target)?.visit_any(visitor)
            }
        )*
    };
}

impl<'de, 'h> Deserializer<'de> for TreeDeserializer<'h> {
    type Error = DecodeError;

    deserialize_coerced! {
        deserialize_any => TargetType::Any,
        deserialize_bool => TargetType::Bool,
        deserialize_i8 => TargetType::Int,
        deserialize_i16 => TargetType::Int,
        deserialize_i32 => TargetType::Int,
        deserialize_i64 => TargetType::Int,
        deserialize_i128 => TargetType::Int,
        deserialize_u8 => TargetType::Uint,
        deserialize_u16 => TargetType::Uint,
        deserialize_u32 => TargetType::Uint,
        deserialize_u64 => TargetType::Uint,
        deserialize_u128 => TargetType::Uint,
        deserialize_f32 => TargetType::Float,
        deserialize_f64 => TargetType::Float,
        deserialize_char => TargetType::Char,
        deserialize_str => TargetType::Str,
        deserialize_string => TargetType::Str,
        deserialize_bytes => TargetType::Bytes,
        deserialize_byte_buf => TargetType::Bytes,
        deserialize_identifier => TargetType::Identifier,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let this = self.coerce(TargetType::Option)?;
        if this.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(this)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::Unit)?.visit_unit_value(visitor)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::UnitStruct(name))?
            .visit_unit_value(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self.coerce(TargetType::Newtype(name))?)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::Seq)?.visit_sequence(visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::Tuple(len))?.visit_sequence(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::TupleStruct { name, len })?
            .visit_sequence(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.coerce(TargetType::Map)?.visit_mapping(None, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let this = self.coerce(TargetType::Struct { name, fields })?;
        if this.value.is_array() {
            this.visit_sequence(visitor)
        } else {
            this.visit_mapping(Some(fields), visitor)
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let Self { value, path, hooks } = self.coerce(TargetType::Enum { name, variants })?;
        let result = match value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant: canonical_name(&variant, variants),
                value: None,
                path: path.clone(),
                hooks,
            }),
            Value::Object(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumDeserializer {
                        variant: canonical_name(&variant, variants),
                        value: Some(value),
                        path: path.clone(),
                        hooks,
                    }),
                    _ => Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"a map with a single key",
                    )),
                }
            }
            other => return Err(invalid_type(&other, &visitor, &path)),
        };
        result.map_err(|e| e.at(&path))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }
}

struct MapDeserializer<'h> {
    entries: serde_json::map::IntoIter,
    fields: Option<&'static [&'static str]>,
    pending: Option<(String, Value)>,
    path: String,
    hooks: &'h HookChain,
}

impl<'h> MapDeserializer<'h> {
    fn new(
        map: Map<String, Value>,
        fields: Option<&'static [&'static str]>,
        path: &str,
        hooks: &'h HookChain,
    ) -> Self {
        Self {
            entries: map.into_iter(),
            fields,
            pending: None,
            path: path.to_string(),
            hooks,
        }
    }
}

impl<'de, 'h> MapAccess<'de> for MapDeserializer<'h> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        // A null struct field counts as absent, leaving it to serde's default.
        let skip_nulls = self.fields.is_some();
        let Some((key, value)) = self
            .entries
            .by_ref()
            .find(|(_, value)| !(skip_nulls && value.is_null()))
        else {
            return Ok(None);
        };

        let field = match self.fields {
            Some(fields) => canonical_name(&key, fields),
            None => key.clone(),
        };
        let child_path = join_path(&self.path, &key);
        let decoded = seed
            .deserialize(KeyDeserializer(field))
            .map_err(|e| e.at(&child_path))?;
        self.pending = Some((child_path, value));
        Ok(Some(decoded))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, DecodeError> {
        match self.pending.take() {
            Some((path, value)) => seed.deserialize(TreeDeserializer::new(value, path, self.hooks)),
            None => Err(de::Error::custom("map value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct SeqDeserializer<'h> {
    items: std::vec::IntoIter<Value>,
    index: usize,
    path: String,
    hooks: &'h HookChain,
}

impl<'de, 'h> SeqAccess<'de> for SeqDeserializer<'h> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        let Some(value) = self.items.next() else {
            return Ok(None);
        };
        let path = format!("{}[{}]", self.path, self.index);
        self.index += 1;
        seed.deserialize(TreeDeserializer::new(value, path, self.hooks))
            .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct EnumDeserializer<'h> {
    variant: String,
    value: Option<Value>,
    path: String,
    hooks: &'h HookChain,
}

impl<'de, 'h> EnumAccess<'de> for EnumDeserializer<'h> {
    type Error = DecodeError;
    type Variant = VariantDeserializer<'h>;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> Result<(S::Value, Self::Variant), DecodeError> {
        let path = join_path(&self.path, &self.variant);
        let variant = seed.deserialize(KeyDeserializer(self.variant))?;
        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                path,
                hooks: self.hooks,
            },
        ))
    }
}

struct VariantDeserializer<'h> {
    value: Option<Value>,
    path: String,
    hooks: &'h HookChain,
}

impl<'h> VariantDeserializer<'h> {
    fn into_payload(self, expected: &'static str) -> Result<TreeDeserializer<'h>, DecodeError> {
        match self.value {
            Some(value) => Ok(TreeDeserializer::new(value, self.path, self.hooks)),
            None => Err(de::Error::invalid_type(Unexpected::UnitVariant, &expected)),
        }
    }
}

impl<'de, 'h> VariantAccess<'de> for VariantDeserializer<'h> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), DecodeError> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(invalid_type(&other, &"unit variant", &self.path)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, DecodeError> {
        seed.deserialize(self.into_payload("newtype variant")?)
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.into_payload("tuple variant")?
            .deserialize_tuple(len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        self.into_payload("struct variant")?
            .deserialize_struct("", fields, visitor)
    }
}

/// Map keys are always strings in the tree; numeric and boolean key types
/// are parsed from them.
struct KeyDeserializer(String);

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident($ty:ty),)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                match self.0.parse::<$ty>() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => Err(de::Error::invalid_type(Unexpected::Str(&self.0), &visitor)),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for KeyDeserializer {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_string(self.0)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i64(i64),
        deserialize_i16 => visit_i64(i64),
        deserialize_i32 => visit_i64(i64),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u64(u64),
        deserialize_u16 => visit_u64(u64),
        deserialize_u32 => visit_u64(u64),
        deserialize_u64 => visit_u64(u64),
        deserialize_f32 => visit_f64(f64),
        deserialize_f64 => visit_f64(f64),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let variant: StringDeserializer<DecodeError> =
            canonical_name(&self.0, variants).into_deserializer();
        visitor.visit_enum(variant)
    }

    serde::forward_to_deserialize_any! {
        i128 u128 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

fn visit_number<'de, V: Visitor<'de>>(n: &Number, visitor: V) -> Result<V::Value, DecodeError> {
    if let Some(u) = n.as_u64() {
        visitor.visit_u64(u)
    } else if let Some(i) = n.as_i64() {
        visitor.visit_i64(i)
    } else if let Some(f) = n.as_f64() {
        visitor.visit_f64(f)
    } else {
        Err(de::Error::custom(format!("unsupported number {n}")))
    }
}

fn visit_array<'de, V: Visitor<'de>>(
    items: Vec<Value>,
    path: &str,
    hooks: &HookChain,
    visitor: V,
) -> Result<V::Value, DecodeError> {
    let len = items.len();
    let mut seq = SeqDeserializer {
        items: items.into_iter(),
        index: 0,
        path: path.to_string(),
        hooks,
    };
    let value = visitor.visit_seq(&mut seq)?;
    if seq.items.len() == 0 {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer elements in sequence"))
    }
}

fn invalid_type(value: &Value, expected: &dyn de::Expected, path: &str) -> DecodeError {
    <DecodeError as de::Error>::invalid_type(unexpected(value), expected).at(path)
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Unexpected::Unsigned(u)
            } else if let Some(i) = n.as_i64() {
                Unexpected::Signed(i)
            } else {
                Unexpected::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// The declared name matching `key`: exact first, then ignoring ASCII case.
fn canonical_name(key: &str, declared: &'static [&'static str]) -> String {
    if declared.contains(&key) {
        return key.to_string();
    }
    declared
        .iter()
        .find(|name| name.eq_ignore_ascii_case(key))
        .map_or_else(|| key.to_string(), |name| name.to_string())
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

/// The first type `T` asks a deserializer for, looking through `Option` and
/// newtype wrappers.
pub(crate) fn requested_type<T: DeserializeOwned>() -> TargetType {
    match T::deserialize(TypeSniffer) {
        Err(Sniffed::Requested(target)) => target,
        _ => TargetType::Any,
    }
}

#[derive(Debug, thiserror::Error)]
enum Sniffed {
    #[error("requested {0}")]
    Requested(TargetType),

    #[error("{0}")]
    Custom(String),
}

impl de::Error for Sniffed {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Sniffed::Custom(msg.to_string())
    }
}

/// Answers every request with the requested type instead of a value.
struct TypeSniffer;

macro_rules! sniff {
    ($($method:ident => $target:expr,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Sniffed> {
                Err(Sniffed::Requested($target))
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TypeSniffer {
    type Error = Sniffed;

    sniff! {
        deserialize_any => TargetType::Any,
        deserialize_bool => TargetType::Bool,
        deserialize_i8 => TargetType::Int,
        deserialize_i16 => TargetType::Int,
        deserialize_i32 => TargetType::Int,
        deserialize_i64 => TargetType::Int,
        deserialize_i128 => TargetType::Int,
        deserialize_u8 => TargetType::Uint,
        deserialize_u16 => TargetType::Uint,
        deserialize_u32 => TargetType::Uint,
        deserialize_u64 => TargetType::Uint,
        deserialize_u128 => TargetType::Uint,
        deserialize_f32 => TargetType::Float,
        deserialize_f64 => TargetType::Float,
        deserialize_char => TargetType::Char,
        deserialize_str => TargetType::Str,
        deserialize_string => TargetType::Str,
        deserialize_bytes => TargetType::Bytes,
        deserialize_byte_buf => TargetType::Bytes,
        deserialize_unit => TargetType::Unit,
        deserialize_seq => TargetType::Seq,
        deserialize_map => TargetType::Map,
        deserialize_identifier => TargetType::Identifier,
        deserialize_ignored_any => TargetType::Any,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Sniffed> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Sniffed> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Sniffed> {
        Err(Sniffed::Requested(TargetType::UnitStruct(name)))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        _visitor: V,
    ) -> Result<V::Value, Sniffed> {
        Err(Sniffed::Requested(TargetType::Tuple(len)))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        _visitor: V,
    ) -> Result<V::Value, Sniffed> {
        Err(Sniffed::Requested(TargetType::TupleStruct { name, len }))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Sniffed> {
        Err(Sniffed::Requested(TargetType::Struct { name, fields }))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Sniffed> {
        Err(Sniffed::Requested(TargetType::Enum { name, variants }))
    }
}
