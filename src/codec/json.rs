//! JSON to [`Value`] conversion guided by the schema
//!
//! Accepts the shapes Anchor's TypeScript client produces: large integers as
//! strings, addresses as base58, `bytes` as a number array or base64 string,
//! enums as `"Variant"` or `{"variant": payload}`.

use base64::Engine;
use serde_json::Value as Json;
use solana_sdk::pubkey::Pubkey;

use super::Codec;
use crate::error::{EncodeError, Error, Result};
use crate::idl::{IdlDefinedFields, IdlField, IdlPrimitive, IdlType, IdlTypeDefTy};
use crate::registry::Registry;
use crate::value::{EnumFields, Value};

/// Convert JSON into a value of `ty` against `registry`
pub(crate) fn read_json(registry: &Registry, ty: &IdlType, json: &Json) -> Result<Value> {
    JsonReader::new(registry).read(ty, json)
}

impl Codec {
    /// Convert JSON into a value of `ty`
    pub fn value_from_json(&self, ty: &IdlType, json: &Json) -> Result<Value> {
        read_json(&self.registry, ty, json)
    }

    /// Convert a JSON object of named arguments into an instruction's argument struct
    pub fn args_from_json(&self, instruction: &str, json: &Json) -> Result<Value> {
        let ix = self.registry.instruction(instruction)?;
        if ix.args.is_empty() && json.is_null() {
            return Ok(Value::Struct(Vec::new()));
        }
        JsonReader::new(&self.registry).named(&ix.args, json, "arguments")
    }
}

struct JsonReader<'r> {
    registry: &'r Registry,
    path: Vec<String>,
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl<'r> JsonReader<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: Vec::new(),
        }
    }

    fn path(&self) -> String {
        if self.path.is_empty() {
            return "<root>".to_string();
        }
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    fn mismatch(&self, expected: impl ToString, found: &Json) -> Error {
        EncodeError::TypeMismatch {
            expected: expected.to_string(),
            found: kind(found).to_string(),
            path: self.path(),
        }
        .into()
    }

    fn overflow(&self, p: IdlPrimitive, json: &Json) -> Error {
        EncodeError::IntegerOverflow {
            ty: p.to_string(),
            value: json.to_string(),
            path: self.path(),
        }
        .into()
    }

    fn within<T>(&mut self, segment: String, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn read(&mut self, ty: &IdlType, json: &Json) -> Result<Value> {
        match ty {
            IdlType::Primitive(p) => self.primitive(*p, json),
            IdlType::Vec { vec: inner } => Ok(Value::Vec(self.items(ty, inner, json)?)),
            IdlType::Array { array } => {
                let items = self.items(ty, &array.0, json)?;
                if items.len() != array.1 {
                    return Err(EncodeError::ArrayLength {
                        expected: array.1,
                        found: items.len(),
                        path: self.path(),
                    }
                    .into());
                }
                Ok(Value::Array(items))
            }
            IdlType::Option { option: inner } | IdlType::COption { coption: inner } => match json {
                Json::Null => Ok(Value::none()),
                other => Ok(Value::some(self.read(inner, other)?)),
            },
            IdlType::Defined { defined } => self.defined(defined.name(), json),
        }
    }

    fn items(&mut self, ty: &IdlType, inner: &IdlType, json: &Json) -> Result<Vec<Value>> {
        let Json::Array(items) = json else {
            return Err(self.mismatch(ty, json));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.within(format!("[{}]", i), |r| r.read(inner, item)))
            .collect()
    }

    fn primitive(&mut self, p: IdlPrimitive, json: &Json) -> Result<Value> {
        macro_rules! int {
            ($t:ty, $variant:ident) => {{
                let parsed: Option<i128> = match json {
                    Json::Number(n) => n.as_i64().map(i128::from).or(n.as_u64().map(i128::from)),
                    Json::String(s) => s.trim().parse::<i128>().ok(),
                    other => return Err(self.mismatch(p, other)),
                };
                let n = parsed.ok_or_else(|| self.overflow(p, json))?;
                Value::$variant(<$t>::try_from(n).map_err(|_| self.overflow(p, json))?)
            }};
        }

        Ok(match p {
            IdlPrimitive::Bool => match json {
                Json::Bool(b) => Value::Bool(*b),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::U8 => int!(u8, U8),
            IdlPrimitive::I8 => int!(i8, I8),
            IdlPrimitive::U16 => int!(u16, U16),
            IdlPrimitive::I16 => int!(i16, I16),
            IdlPrimitive::U32 => int!(u32, U32),
            IdlPrimitive::I32 => int!(i32, I32),
            IdlPrimitive::U64 => int!(u64, U64),
            IdlPrimitive::I64 => int!(i64, I64),
            IdlPrimitive::U128 => match json {
                Json::String(s) => Value::U128(s.trim().parse().map_err(|_| self.overflow(p, json))?),
                _ => int!(u128, U128),
            },
            IdlPrimitive::I128 => int!(i128, I128),
            IdlPrimitive::F32 => match json.as_f64() {
                Some(f) => Value::F32(f as f32),
                None => return Err(self.mismatch(p, json)),
            },
            IdlPrimitive::F64 => match json.as_f64() {
                Some(f) => Value::F64(f),
                None => return Err(self.mismatch(p, json)),
            },
            IdlPrimitive::String => match json {
                Json::String(s) => Value::String(s.clone()),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::Bytes => match json {
                Json::String(s) => Value::Bytes(
                    base64::engine::general_purpose::STANDARD
                        .decode(s)
                        .map_err(|_| self.mismatch("base64 bytes", json))?,
                ),
                Json::Array(items) => Value::Bytes(
                    items
                        .iter()
                        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                        .collect::<Option<Vec<u8>>>()
                        .ok_or_else(|| self.mismatch("byte array", json))?,
                ),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::Pubkey => match json {
                Json::String(s) => Value::Pubkey(self.pubkey(s, json)?),
                other => return Err(self.mismatch(p, other)),
            },
        })
    }

    fn pubkey(&self, text: &str, json: &Json) -> Result<Pubkey> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|_| self.mismatch("base58 pubkey", json))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| self.mismatch("32-byte pubkey", json))?;
        Ok(Pubkey::new_from_array(bytes))
    }

    fn defined(&mut self, name: &str, json: &Json) -> Result<Value> {
        let registry = self.registry;
        let def = registry.type_def(name)?;
        match &def.ty {
            IdlTypeDefTy::Struct { fields: None } => Ok(Value::Struct(Vec::new())),
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Named(fields)),
            } => self.named(fields, json, name),
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Tuple(types)),
            } => Ok(Value::Tuple(self.tuple(types, json, name)?)),
            IdlTypeDefTy::Enum { variants } => {
                let (key, payload) = match json {
                    Json::String(s) => (s.as_str(), None),
                    Json::Object(map) if map.len() == 1 => {
                        let Some((k, v)) = map.iter().next() else {
                            return Err(self.mismatch(name, json));
                        };
                        (k.as_str(), Some(v))
                    }
                    other => return Err(self.mismatch(name, other)),
                };
                let variant = variants
                    .iter()
                    .find(|v| v.name == key)
                    .or_else(|| variants.iter().find(|v| v.name.eq_ignore_ascii_case(key)))
                    .ok_or_else(|| EncodeError::UnknownVariant {
                        ty: name.to_string(),
                        variant: key.to_string(),
                    })?;
                let fields = match (&variant.fields, payload) {
                    (None, _) => EnumFields::Unit,
                    (Some(IdlDefinedFields::Named(fields)), Some(payload)) => {
                        let Value::Struct(named) = self.named(fields, payload, &variant.name)? else {
                            return Err(self.mismatch(&variant.name, payload));
                        };
                        EnumFields::Named(named)
                    }
                    (Some(IdlDefinedFields::Tuple(types)), Some(payload)) => {
                        EnumFields::Tuple(self.tuple(types, payload, &variant.name)?)
                    }
                    (Some(_), None) => return Err(self.mismatch(&variant.name, json)),
                };
                Ok(Value::Enum {
                    variant: variant.name.clone(),
                    fields,
                })
            }
        }
    }

    fn named(&mut self, fields: &[IdlField], json: &Json, owner: &str) -> Result<Value> {
        let Json::Object(map) = json else {
            return Err(self.mismatch(owner, json));
        };
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            let value = match map.get(&field.name) {
                Some(v) => self.within(field.name.clone(), |r| r.read(&field.ty, v))?,
                None if matches!(field.ty, IdlType::Option { .. } | IdlType::COption { .. }) => {
                    Value::none()
                }
                None => {
                    return Err(EncodeError::MissingField {
                        field: field.name.clone(),
                        path: self.path(),
                    }
                    .into())
                }
            };
            out.push((field.name.clone(), value));
        }
        Ok(Value::Struct(out))
    }

    fn tuple(&mut self, types: &[IdlType], json: &Json, owner: &str) -> Result<Vec<Value>> {
        let Json::Array(items) = json else {
            return Err(self.mismatch(owner, json));
        };
        if items.len() != types.len() {
            return Err(EncodeError::ArrayLength {
                expected: types.len(),
                found: items.len(),
                path: self.path(),
            }
            .into());
        }
        types
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (ty, item))| self.within(i.to_string(), |r| r.read(ty, item)))
            .collect()
    }
}
