//! Dynamic values moved through the codec
//!
//! [`Value`] mirrors the schema type model: one variant per primitive plus
//! structs, tuples, enums, options and sequences. It converts to and from
//! JSON for callers that work with `serde_json` documents.

use serde_json::{json, Map};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::error::Result;
use crate::idl::IdlType;
use crate::registry::Registry;

/// Decoded value representation
///
/// Produced by the codec's decoders and consumed by its encoders. Integer
/// variants carry their declared width so values can also be turned into seed
/// bytes without consulting the schema again.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Primitives
    /// Boolean value
    Bool(bool),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 128-bit integer
    U128(u128),
    /// Signed 128-bit integer
    I128(i128),
    /// Single-precision float
    F32(f32),
    /// Double-precision float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Byte string (`bytes`)
    Bytes(Vec<u8>),
    /// 32-byte address
    Pubkey(Pubkey),

    // Composites
    /// Variable-length vector
    Vec(Vec<Value>),
    /// Fixed-length array
    Array(Vec<Value>),
    /// Optional value (`option` and `coption`)
    Option(Option<Box<Value>>),
    /// Struct with named fields in declaration order
    Struct(Vec<(String, Value)>),
    /// Tuple struct
    Tuple(Vec<Value>),
    /// Enum variant with its payload
    Enum {
        /// Variant name
        variant: String,
        /// Variant payload
        fields: EnumFields,
    },
}

/// Payload of an enum variant
#[derive(Debug, Clone, PartialEq)]
pub enum EnumFields {
    /// No payload
    Unit,
    /// Positional payload
    Tuple(Vec<Value>),
    /// Named payload in declaration order
    Named(Vec<(String, Value)>),
}

impl Value {
    /// Build a struct value from `(name, value)` pairs
    pub fn structure<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `Some(value)` for `option`/`coption` types
    pub fn some(value: Value) -> Self {
        Value::Option(Some(Box::new(value)))
    }

    /// Absent `option`/`coption` value
    pub fn none() -> Self {
        Value::Option(None)
    }

    /// Enum variant without payload
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Value::Enum {
            variant: name.into(),
            fields: EnumFields::Unit,
        }
    }

    /// Short kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::U128(_) => "u128",
            Value::I128(_) => "i128",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Pubkey(_) => "pubkey",
            Value::Vec(_) => "vec",
            Value::Array(_) => "array",
            Value::Option(_) => "option",
            Value::Struct(_) => "struct",
            Value::Tuple(_) => "tuple",
            Value::Enum { .. } => "enum",
        }
    }

    /// Field of a struct value (or of a named enum payload)
    pub fn get(&self, name: &str) -> Option<&Value> {
        let fields = match self {
            Value::Struct(fields) => fields,
            Value::Enum {
                fields: EnumFields::Named(fields),
                ..
            } => fields,
            _ => return None,
        };
        fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Walk a dotted path (`a.b.c`) of struct fields
    ///
    /// Present options are looked through so `config.owner` works when
    /// `config` is `option<Config>`.
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            if let Value::Option(Some(inner)) = current {
                current = inner;
            }
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Integer value widened to i128, `None` for non-integers and u128 above i128::MAX
    pub fn as_i128(&self) -> Option<i128> {
        Some(match self {
            Value::U8(n) => *n as i128,
            Value::I8(n) => *n as i128,
            Value::U16(n) => *n as i128,
            Value::I16(n) => *n as i128,
            Value::U32(n) => *n as i128,
            Value::I32(n) => *n as i128,
            Value::U64(n) => *n as i128,
            Value::I64(n) => *n as i128,
            Value::U128(n) => i128::try_from(*n).ok()?,
            Value::I128(n) => *n,
            _ => return None,
        })
    }

    /// Address value, if this is one
    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            Value::Pubkey(key) => Some(key),
            _ => None,
        }
    }

    /// String value, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a value of `ty` from JSON in the shape Anchor clients use
    pub fn from_json(ty: &IdlType, json: &serde_json::Value, registry: &Registry) -> Result<Value> {
        crate::codec::read_json(registry, ty, json)
    }

    /// Convert to JSON in the shape Anchor clients use
    ///
    /// 128-bit integers and addresses become strings; enums become
    /// `{"Variant": payload}` with `{}` for unit variants.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => json!(b),
            Value::U8(n) => json!(n),
            Value::I8(n) => json!(n),
            Value::U16(n) => json!(n),
            Value::I16(n) => json!(n),
            Value::U32(n) => json!(n),
            Value::I32(n) => json!(n),
            Value::U64(n) => json!(n),
            Value::I64(n) => json!(n),
            Value::U128(n) => json!(n.to_string()),
            Value::I128(n) => json!(n.to_string()),
            Value::F32(f) => json!(f),
            Value::F64(f) => json!(f),
            Value::String(s) => json!(s),
            Value::Bytes(bytes) => json!(bytes),
            Value::Pubkey(key) => json!(key.to_string()),
            Value::Vec(items) | Value::Array(items) | Value::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Option(None) => serde_json::Value::Null,
            Value::Option(Some(inner)) => inner.to_json(),
            Value::Struct(fields) => named_to_json(fields),
            Value::Enum { variant, fields } => {
                let payload = match fields {
                    EnumFields::Unit => serde_json::Value::Object(Map::new()),
                    EnumFields::Tuple(items) => {
                        serde_json::Value::Array(items.iter().map(Value::to_json).collect())
                    }
                    EnumFields::Named(named) => named_to_json(named),
                };
                let mut map = Map::new();
                map.insert(variant.clone(), payload);
                serde_json::Value::Object(map)
            }
        }
    }
}

fn named_to_json(fields: &[(String, Value)]) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::U8(n)
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::U16(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::U32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Pubkey> for Value {
    fn from(key: Pubkey) -> Self {
        Value::Pubkey(key)
    }
}
