//! Seed serialization
//!
//! Seeds use the raw primitive encoding: fixed-width little-endian numbers,
//! 32-byte addresses, and strings or byte sequences verbatim with no length
//! prefix.

use crate::value::Value;

/// Serialize a value as derivation seed bytes
///
/// Composite values (structs, enums, options, vectors of anything but bytes)
/// have no seed form and are rejected with a description of what was found.
pub fn seed_bytes(value: &Value) -> Result<Vec<u8>, String> {
    Ok(match value {
        Value::Bool(b) => vec![*b as u8],
        Value::U8(n) => vec![*n],
        Value::I8(n) => n.to_le_bytes().to_vec(),
        Value::U16(n) => n.to_le_bytes().to_vec(),
        Value::I16(n) => n.to_le_bytes().to_vec(),
        Value::U32(n) => n.to_le_bytes().to_vec(),
        Value::I32(n) => n.to_le_bytes().to_vec(),
        Value::U64(n) => n.to_le_bytes().to_vec(),
        Value::I64(n) => n.to_le_bytes().to_vec(),
        Value::U128(n) => n.to_le_bytes().to_vec(),
        Value::I128(n) => n.to_le_bytes().to_vec(),
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Bytes(bytes) => bytes.clone(),
        Value::Pubkey(key) => key.to_bytes().to_vec(),
        Value::Vec(items) | Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::U8(b) => Ok(*b),
                other => Err(format!("{} element in a byte seed", other.type_name())),
            })
            .collect::<Result<Vec<u8>, String>>()?,
        other => return Err(format!("{} values cannot be used as seeds", other.type_name())),
    })
}
