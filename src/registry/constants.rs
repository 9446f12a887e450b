//! Parsing of `constants[]` values into seed bytes

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::idl::{IdlConst, IdlPrimitive, IdlType};

/// A schema constant with its value already serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDef {
    /// Constant name
    pub name: String,
    /// Declared type
    pub ty: IdlType,
    /// Raw bytes, as used when the constant is a derivation seed
    pub bytes: Vec<u8>,
}

impl ConstDef {
    /// Parse an IDL constant
    pub fn parse(def: &IdlConst) -> Result<Self, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidConstant {
            name: def.name.clone(),
            reason,
        };
        let raw = def.value.trim();

        let bytes = match &def.ty {
            IdlType::Primitive(IdlPrimitive::Bytes) => parse_byte_literal(raw).map_err(invalid)?,
            IdlType::Array { array } if *array.0 == IdlType::Primitive(IdlPrimitive::U8) => {
                let bytes = parse_byte_literal(raw).map_err(invalid)?;
                if bytes.len() != array.1 {
                    return Err(invalid(format!(
                        "expected {} bytes, got {}",
                        array.1,
                        bytes.len()
                    )));
                }
                bytes
            }
            IdlType::Primitive(IdlPrimitive::String) => {
                if raw.starts_with('"') {
                    serde_json::from_str::<String>(raw)
                        .map_err(|e| invalid(e.to_string()))?
                        .into_bytes()
                } else {
                    raw.as_bytes().to_vec()
                }
            }
            IdlType::Primitive(IdlPrimitive::Pubkey) => Pubkey::from_str(raw)
                .map_err(|e| invalid(e.to_string()))?
                .to_bytes()
                .to_vec(),
            IdlType::Primitive(IdlPrimitive::Bool) => match raw {
                "true" => vec![1],
                "false" => vec![0],
                other => return Err(invalid(format!("`{}` is not a bool", other))),
            },
            IdlType::Primitive(p) => integer_bytes(*p, raw).map_err(invalid)?,
            other => return Err(invalid(format!("unsupported constant type {}", other))),
        };

        Ok(Self {
            name: def.name.clone(),
            ty: def.ty.clone(),
            bytes,
        })
    }
}

/// Parse `b"..."`, a JSON byte array, or a bare string
fn parse_byte_literal(raw: &str) -> Result<Vec<u8>, String> {
    if let Some(inner) = raw.strip_prefix("b\"").and_then(|r| r.strip_suffix('"')) {
        return Ok(unescape(inner).into_bytes());
    }
    if raw.starts_with('[') {
        return serde_json::from_str::<Vec<u8>>(raw).map_err(|e| e.to_string());
    }
    Ok(raw.as_bytes().to_vec())
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Serialize a decimal literal at the primitive's width, little-endian
pub(crate) fn integer_bytes(ty: IdlPrimitive, raw: &str) -> Result<Vec<u8>, String> {
    // Accept Rust-style `1_000` and suffixed `100u64`
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let digits = cleaned
        .strip_suffix(ty.as_str())
        .unwrap_or(cleaned.as_str());
    let err = |e: std::num::ParseIntError| format!("`{}` is not a valid {}: {}", raw, ty, e);

    Ok(match ty {
        IdlPrimitive::U8 => digits.parse::<u8>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::I8 => digits.parse::<i8>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::U16 => digits.parse::<u16>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::I16 => digits.parse::<i16>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::U32 => digits.parse::<u32>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::I32 => digits.parse::<i32>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::U64 => digits.parse::<u64>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::I64 => digits.parse::<i64>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::U128 => digits.parse::<u128>().map_err(err)?.to_le_bytes().to_vec(),
        IdlPrimitive::I128 => digits.parse::<i128>().map_err(err)?.to_le_bytes().to_vec(),
        other => return Err(format!("{} is not an integer type", other)),
    })
}
