//! Type-directed encoder

use super::Layout;
use crate::error::{EncodeError, Result};
use crate::idl::{IdlDefinedFields, IdlField, IdlPrimitive, IdlType, IdlTypeDefTy};
use crate::registry::Registry;
use crate::value::{EnumFields, Value};

/// Output buffer plus the field path used in error reports
pub(crate) struct Encoder<'r> {
    registry: &'r Registry,
    out: Vec<u8>,
    path: String,
}

impl<'r> Encoder<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            out: Vec::new(),
            path: String::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out
    }

    /// Append bytes verbatim (discriminators)
    pub(crate) fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Encode an instruction's argument tuple from a struct value
    pub(crate) fn args(&mut self, args: &[IdlField], value: &Value) -> Result<()> {
        if args.is_empty() && matches!(value, Value::Tuple(v) if v.is_empty()) {
            return Ok(());
        }
        let Value::Struct(supplied) = value else {
            return Err(self.mismatch("struct", value));
        };
        self.named_fields(args, supplied, Layout::default())
    }

    fn path(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.clone()
        }
    }

    fn mismatch(&self, expected: impl ToString, found: &Value) -> crate::error::Error {
        EncodeError::TypeMismatch {
            expected: expected.to_string(),
            found: found.type_name().to_string(),
            path: self.path(),
        }
        .into()
    }

    fn overflow(&self, ty: IdlPrimitive, value: &Value) -> crate::error::Error {
        EncodeError::IntegerOverflow {
            ty: ty.to_string(),
            value: value.to_string(),
            path: self.path(),
        }
        .into()
    }

    /// Run `f` with `segment` appended to the current path
    fn nested<T>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.path.len();
        if !self.path.is_empty() && !segment.starts_with('[') {
            self.path.push('.');
        }
        self.path.push_str(segment);
        let result = f(self);
        self.path.truncate(saved);
        result
    }

    fn length(&mut self, len: usize, layout: Layout) -> Result<()> {
        if len as u64 > layout.prefix.max() {
            return Err(EncodeError::LengthOverflow {
                len,
                width: layout.prefix.bytes(),
                path: self.path(),
            }
            .into());
        }
        self.width(len as u64, layout.prefix);
        Ok(())
    }

    fn width(&mut self, n: u64, width: crate::idl::IntWidth) {
        let bytes = n.to_le_bytes();
        self.out.extend_from_slice(&bytes[..width.bytes()]);
    }

    /// Encode `value` as `ty`
    pub(crate) fn encode(&mut self, ty: &IdlType, value: &Value, layout: Layout) -> Result<()> {
        match ty {
            IdlType::Primitive(p) => self.primitive(*p, value, layout),
            IdlType::Vec { vec: inner } => match value {
                Value::Vec(items) => {
                    self.length(items.len(), layout)?;
                    self.elements(inner, items, layout)
                }
                Value::Bytes(bytes) if is_u8(inner) => {
                    self.length(bytes.len(), layout)?;
                    self.raw(bytes);
                    Ok(())
                }
                other => Err(self.mismatch(ty, other)),
            },
            IdlType::Option { option: inner } => match value {
                Value::Option(None) => {
                    self.out.push(0);
                    Ok(())
                }
                Value::Option(Some(inner_value)) => {
                    self.out.push(1);
                    self.encode(inner, inner_value, layout)
                }
                other => Err(self.mismatch(ty, other)),
            },
            IdlType::COption { coption: inner } => match value {
                Value::Option(None) => {
                    self.out.extend_from_slice(&0u32.to_le_bytes());
                    Ok(())
                }
                Value::Option(Some(inner_value)) => {
                    self.out.extend_from_slice(&1u32.to_le_bytes());
                    self.encode(inner, inner_value, layout)
                }
                other => Err(self.mismatch(ty, other)),
            },
            IdlType::Array { array } => {
                let (inner, len) = (&array.0, array.1);
                let found = match value {
                    Value::Array(items) | Value::Vec(items) => items.len(),
                    Value::Bytes(bytes) if is_u8(inner) => bytes.len(),
                    other => return Err(self.mismatch(ty, other)),
                };
                if found != len {
                    return Err(EncodeError::ArrayLength {
                        expected: len,
                        found,
                        path: self.path(),
                    }
                    .into());
                }
                match value {
                    Value::Bytes(bytes) => {
                        self.raw(bytes);
                        Ok(())
                    }
                    Value::Array(items) | Value::Vec(items) => self.elements(inner, items, layout),
                    _ => Ok(()),
                }
            }
            IdlType::Defined { defined } => self.defined(defined.name(), value),
        }
    }

    fn elements(&mut self, inner: &IdlType, items: &[Value], layout: Layout) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.nested(&format!("[{}]", i), |enc| enc.encode(inner, item, layout))?;
        }
        Ok(())
    }

    fn primitive(&mut self, p: IdlPrimitive, value: &Value, layout: Layout) -> Result<()> {
        macro_rules! int {
            ($t:ty) => {{
                let n = match value.as_i128() {
                    Some(n) => n,
                    None if matches!(value, Value::U128(_)) => return Err(self.overflow(p, value)),
                    None => return Err(self.mismatch(p, value)),
                };
                let v = <$t>::try_from(n).map_err(|_| self.overflow(p, value))?;
                self.out.extend_from_slice(&v.to_le_bytes());
            }};
        }

        match p {
            IdlPrimitive::Bool => match value {
                Value::Bool(b) => self.out.push(*b as u8),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::U8 => int!(u8),
            IdlPrimitive::I8 => int!(i8),
            IdlPrimitive::U16 => int!(u16),
            IdlPrimitive::I16 => int!(i16),
            IdlPrimitive::U32 => int!(u32),
            IdlPrimitive::I32 => int!(i32),
            IdlPrimitive::U64 => int!(u64),
            IdlPrimitive::I64 => int!(i64),
            IdlPrimitive::U128 => match value {
                Value::U128(n) => self.out.extend_from_slice(&n.to_le_bytes()),
                _ => int!(u128),
            },
            IdlPrimitive::I128 => int!(i128),
            IdlPrimitive::F32 => match value {
                Value::F32(f) => self.out.extend_from_slice(&f.to_le_bytes()),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::F64 => match value {
                Value::F64(f) => self.out.extend_from_slice(&f.to_le_bytes()),
                Value::F32(f) => self.out.extend_from_slice(&(*f as f64).to_le_bytes()),
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::String => match value {
                Value::String(s) => {
                    self.length(s.len(), layout)?;
                    self.raw(s.as_bytes());
                }
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::Bytes => match value {
                Value::Bytes(bytes) => {
                    self.length(bytes.len(), layout)?;
                    self.raw(bytes);
                }
                other => return Err(self.mismatch(p, other)),
            },
            IdlPrimitive::Pubkey => match value {
                Value::Pubkey(key) => self.raw(key.as_ref()),
                other => return Err(self.mismatch(p, other)),
            },
        }
        Ok(())
    }

    fn defined(&mut self, name: &str, value: &Value) -> Result<()> {
        let registry = self.registry;
        let def = registry.type_def(name)?;
        let layout = Layout::of(def);

        match &def.ty {
            IdlTypeDefTy::Struct { fields: None } => match value {
                Value::Struct(f) if f.is_empty() => Ok(()),
                Value::Tuple(f) if f.is_empty() => Ok(()),
                other => Err(self.mismatch(name, other)),
            },
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Named(fields)),
            } => match value {
                Value::Struct(supplied) => self.named_fields(fields, supplied, layout),
                other => Err(self.mismatch(name, other)),
            },
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Tuple(types)),
            } => match value {
                Value::Tuple(items) => self.tuple_fields(name, types, items, layout),
                other => Err(self.mismatch(name, other)),
            },
            IdlTypeDefTy::Enum { variants } => {
                let Value::Enum { variant, fields } = value else {
                    return Err(self.mismatch(name, value));
                };
                let index = variants
                    .iter()
                    .position(|v| &v.name == variant)
                    .ok_or_else(|| EncodeError::UnknownVariant {
                        ty: name.to_string(),
                        variant: variant.clone(),
                    })?;
                if index as u64 > layout.tag.max() {
                    return Err(EncodeError::TagOverflow {
                        ty: name.to_string(),
                        index,
                        width: layout.tag.bytes(),
                    }
                    .into());
                }
                self.width(index as u64, layout.tag);

                let declared = variants[index].fields.as_ref();
                self.nested(variant, |enc| match (declared, fields) {
                    (None, EnumFields::Unit) => Ok(()),
                    (None, EnumFields::Tuple(v)) if v.is_empty() => Ok(()),
                    (None, EnumFields::Named(v)) if v.is_empty() => Ok(()),
                    (Some(IdlDefinedFields::Named(declared)), EnumFields::Named(supplied)) => {
                        enc.named_fields(declared, supplied, layout)
                    }
                    (Some(IdlDefinedFields::Tuple(types)), EnumFields::Tuple(items)) => {
                        enc.tuple_fields(variant, types, items, layout)
                    }
                    _ => Err(enc.mismatch(format!("{}::{}", name, variant), value)),
                })
            }
        }
    }

    fn named_fields(
        &mut self,
        declared: &[IdlField],
        supplied: &[(String, Value)],
        layout: Layout,
    ) -> Result<()> {
        for field in declared {
            let value = supplied
                .iter()
                .find(|(k, _)| k == &field.name)
                .map(|(_, v)| v)
                .ok_or_else(|| EncodeError::MissingField {
                    field: field.name.clone(),
                    path: self.path(),
                })?;
            self.nested(&field.name, |enc| enc.encode(&field.ty, value, layout))?;
        }
        Ok(())
    }

    fn tuple_fields(
        &mut self,
        owner: &str,
        types: &[IdlType],
        items: &[Value],
        layout: Layout,
    ) -> Result<()> {
        if types.len() != items.len() {
            return Err(EncodeError::TypeMismatch {
                expected: format!("{} with {} fields", owner, types.len()),
                found: format!("tuple with {} fields", items.len()),
                path: self.path(),
            }
            .into());
        }
        for (i, (ty, item)) in types.iter().zip(items).enumerate() {
            self.nested(&i.to_string(), |enc| enc.encode(ty, item, layout))?;
        }
        Ok(())
    }
}

fn is_u8(ty: &IdlType) -> bool {
    matches!(ty, IdlType::Primitive(IdlPrimitive::U8))
}
