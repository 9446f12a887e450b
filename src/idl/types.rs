//! Type references and type definitions of the IDL document

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Primitive IDL types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdlPrimitive {
    /// One byte, 0 or 1
    Bool,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 64-bit integer
    U64,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 128-bit integer
    U128,
    /// Signed 128-bit integer
    I128,
    /// IEEE-754 single precision
    F32,
    /// IEEE-754 double precision
    F64,
    /// Length-prefixed UTF-8 string
    String,
    /// Length-prefixed byte string
    Bytes,
    /// 32-byte address
    Pubkey,
}

impl IdlPrimitive {
    /// Encoded width for fixed-size primitives, `None` for strings and bytes
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            IdlPrimitive::Bool | IdlPrimitive::U8 | IdlPrimitive::I8 => Some(1),
            IdlPrimitive::U16 | IdlPrimitive::I16 => Some(2),
            IdlPrimitive::U32 | IdlPrimitive::I32 | IdlPrimitive::F32 => Some(4),
            IdlPrimitive::U64 | IdlPrimitive::I64 | IdlPrimitive::F64 => Some(8),
            IdlPrimitive::U128 | IdlPrimitive::I128 => Some(16),
            IdlPrimitive::Pubkey => Some(32),
            IdlPrimitive::String | IdlPrimitive::Bytes => None,
        }
    }

    /// Canonical IDL spelling
    pub fn as_str(self) -> &'static str {
        match self {
            IdlPrimitive::Bool => "bool",
            IdlPrimitive::U8 => "u8",
            IdlPrimitive::I8 => "i8",
            IdlPrimitive::U16 => "u16",
            IdlPrimitive::I16 => "i16",
            IdlPrimitive::U32 => "u32",
            IdlPrimitive::I32 => "i32",
            IdlPrimitive::U64 => "u64",
            IdlPrimitive::I64 => "i64",
            IdlPrimitive::U128 => "u128",
            IdlPrimitive::I128 => "i128",
            IdlPrimitive::F32 => "f32",
            IdlPrimitive::F64 => "f64",
            IdlPrimitive::String => "string",
            IdlPrimitive::Bytes => "bytes",
            IdlPrimitive::Pubkey => "pubkey",
        }
    }
}

impl FromStr for IdlPrimitive {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bool" => IdlPrimitive::Bool,
            "u8" => IdlPrimitive::U8,
            "i8" => IdlPrimitive::I8,
            "u16" => IdlPrimitive::U16,
            "i16" => IdlPrimitive::I16,
            "u32" => IdlPrimitive::U32,
            "i32" => IdlPrimitive::I32,
            "u64" => IdlPrimitive::U64,
            "i64" => IdlPrimitive::I64,
            "u128" => IdlPrimitive::U128,
            "i128" => IdlPrimitive::I128,
            "f32" => IdlPrimitive::F32,
            "f64" => IdlPrimitive::F64,
            "string" => IdlPrimitive::String,
            "bytes" => IdlPrimitive::Bytes,
            // Legacy (pre 0.30) spelling
            "pubkey" | "publicKey" => IdlPrimitive::Pubkey,
            other => return Err(SchemaError::UnknownPrimitive(other.to_string())),
        })
    }
}

impl TryFrom<String> for IdlPrimitive {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdlPrimitive> for String {
    fn from(p: IdlPrimitive) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for IdlPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a named type, in either the plain or the object spelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlDefinedRef {
    /// `{"defined": "Name"}`
    Name(String),
    /// `{"defined": {"name": "Name"}}`
    Named {
        /// Type name
        name: String,
    },
}

impl IdlDefinedRef {
    /// Referenced type name
    pub fn name(&self) -> &str {
        match self {
            IdlDefinedRef::Name(name) => name,
            IdlDefinedRef::Named { name } => name,
        }
    }
}

/// Supported IDL types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    /// Primitive type: "u8", "u64", "bool", "string", "pubkey", ...
    Primitive(IdlPrimitive),
    /// Dynamic vector type
    Vec {
        /// Vector element type
        vec: Box<IdlType>,
    },
    /// Optional type with a 1-byte presence flag
    Option {
        /// Inner type
        option: Box<IdlType>,
    },
    /// Optional type with a 4-byte presence tag
    COption {
        /// Inner type
        coption: Box<IdlType>,
    },
    /// Fixed-size array: [type, length]
    Array {
        /// Array element type and size
        array: (Box<IdlType>, usize),
    },
    /// Custom type reference (user-defined)
    Defined {
        /// Type name
        defined: IdlDefinedRef,
    },
}

impl IdlType {
    /// Reference a user-defined type by name
    pub fn defined(name: impl Into<String>) -> Self {
        IdlType::Defined {
            defined: IdlDefinedRef::Name(name.into()),
        }
    }

    /// Vector of `inner`
    pub fn vec(inner: IdlType) -> Self {
        IdlType::Vec {
            vec: Box::new(inner),
        }
    }

    /// Option of `inner`
    pub fn option(inner: IdlType) -> Self {
        IdlType::Option {
            option: Box::new(inner),
        }
    }

    /// COption of `inner`
    pub fn coption(inner: IdlType) -> Self {
        IdlType::COption {
            coption: Box::new(inner),
        }
    }

    /// Fixed array of `len` elements of `inner`
    pub fn array(inner: IdlType, len: usize) -> Self {
        IdlType::Array {
            array: (Box::new(inner), len),
        }
    }

    /// Name of the referenced type for `defined` references
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            IdlType::Defined { defined } => Some(defined.name()),
            _ => None,
        }
    }
}

impl From<IdlPrimitive> for IdlType {
    fn from(p: IdlPrimitive) -> Self {
        IdlType::Primitive(p)
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlType::Primitive(p) => write!(f, "{}", p),
            IdlType::Vec { vec } => write!(f, "vec<{}>", vec),
            IdlType::Option { option } => write!(f, "option<{}>", option),
            IdlType::COption { coption } => write!(f, "coption<{}>", coption),
            IdlType::Array { array } => write!(f, "[{}; {}]", array.0, array.1),
            IdlType::Defined { defined } => f.write_str(defined.name()),
        }
    }
}

/// Width of a length prefix or enum tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    /// One byte
    U8,
    /// Two bytes, little-endian
    U16,
    /// Four bytes, little-endian
    #[default]
    U32,
}

impl IntWidth {
    /// Width in bytes
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::U8 => 1,
            IntWidth::U16 => 2,
            IntWidth::U32 => 4,
        }
    }

    /// Largest value representable at this width
    pub fn max(self) -> u64 {
        match self {
            IntWidth::U8 => u8::MAX as u64,
            IntWidth::U16 => u16::MAX as u64,
            IntWidth::U32 => u32::MAX as u64,
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlField {
    /// Field name
    pub name: String,
    /// Optional documentation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Field type
    #[serde(rename = "type")]
    pub ty: IdlType,
}

impl IdlField {
    /// Create a field
    pub fn new(name: impl Into<String>, ty: impl Into<IdlType>) -> Self {
        Self {
            name: name.into(),
            docs: Vec::new(),
            ty: ty.into(),
        }
    }
}

/// Struct or enum-variant payload: named fields or a tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlDefinedFields {
    /// `[{"name": ..., "type": ...}, ...]`
    Named(Vec<IdlField>),
    /// `[type, type, ...]`
    Tuple(Vec<IdlType>),
}

impl IdlDefinedFields {
    /// Iterate the field types in declaration order
    pub fn types(&self) -> Vec<&IdlType> {
        match self {
            IdlDefinedFields::Named(fields) => fields.iter().map(|f| &f.ty).collect(),
            IdlDefinedFields::Tuple(types) => types.iter().collect(),
        }
    }
}

/// Enum variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlEnumVariant {
    /// Variant name
    pub name: String,
    /// Optional fields for tuple or struct variants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IdlDefinedFields>,
}

/// Type definition inner structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlTypeDefTy {
    /// Struct type with named or tuple fields
    Struct {
        /// Struct field definitions (absent for unit structs)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<IdlDefinedFields>,
    },
    /// Enum type with variants
    Enum {
        /// Enum variant definitions
        variants: Vec<IdlEnumVariant>,
    },
}

/// Type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlTypeDef {
    /// Custom type name
    pub name: String,
    /// Optional documentation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Length-prefix width for strings, bytes and vecs inside this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_prefix: Option<IntWidth>,
    /// Enum tag width (enums only; defaults to one byte)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_width: Option<IntWidth>,
    /// Type structure (struct or enum)
    #[serde(rename = "type")]
    pub ty: IdlTypeDefTy,
}

impl IdlTypeDef {
    /// Struct definition with named fields
    pub fn structure(name: impl Into<String>, fields: Vec<IdlField>) -> Self {
        Self {
            name: name.into(),
            docs: Vec::new(),
            length_prefix: None,
            tag_width: None,
            ty: IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Named(fields)),
            },
        }
    }

    /// Override the length-prefix width
    pub fn with_length_prefix(mut self, width: IntWidth) -> Self {
        self.length_prefix = Some(width);
        self
    }
}
