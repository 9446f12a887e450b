//! Type-directed decoder

use solana_sdk::pubkey::Pubkey;
use std::fmt;

use super::Layout;
use crate::error::{DecodeError, Result};
use crate::idl::{IdlDefinedFields, IdlPrimitive, IdlType, IdlTypeDefTy, IntWidth};
use crate::registry::Registry;
use crate::value::{EnumFields, Value};

/// Cursor over an input buffer
pub(crate) struct Decoder<'r, 'd> {
    registry: &'r Registry,
    data: &'d [u8],
    offset: usize,
    depth: usize,
}

/// Maximum nesting of defined types while decoding
pub const MAX_DECODE_DEPTH: usize = 128;

impl<'r, 'd> Decoder<'r, 'd> {
    pub(crate) fn new(registry: &'r Registry, data: &'d [u8]) -> Self {
        Self {
            registry,
            data,
            offset: 0,
            depth: 0,
        }
    }

    /// Start reading at `offset`, used after a discriminator has been checked
    pub(crate) fn starting_at(registry: &'r Registry, data: &'d [u8], offset: usize) -> Self {
        Self {
            registry,
            data,
            offset: offset.min(data.len()),
            depth: 0,
        }
    }

    /// Bytes consumed so far
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, n: usize, ty: &dyn fmt::Display) -> std::result::Result<&'d [u8], DecodeError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::BufferTooShort {
                ty: ty.to_string(),
                offset: self.offset,
                needed: n,
                remaining,
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(
        &mut self,
        ty: &dyn fmt::Display,
    ) -> std::result::Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, ty)?);
        Ok(out)
    }

    fn read_width(&mut self, width: IntWidth, ty: &dyn fmt::Display) -> std::result::Result<u64, DecodeError> {
        Ok(match width {
            IntWidth::U8 => self.take_array::<1>(ty)?[0] as u64,
            IntWidth::U16 => u16::from_le_bytes(self.take_array(ty)?) as u64,
            IntWidth::U32 => u32::from_le_bytes(self.take_array(ty)?) as u64,
        })
    }

    /// Read a length prefix and check the payload can possibly fit
    ///
    /// Elements are counted as at least one byte, so a prefix can never claim
    /// more elements than there are bytes left even when the element type
    /// encodes to nothing.
    fn read_len(
        &mut self,
        layout: Layout,
        element_size: usize,
        ty: &dyn fmt::Display,
    ) -> std::result::Result<usize, DecodeError> {
        let len = self.read_width(layout.prefix, ty)? as usize;
        let needed = len.saturating_mul(element_size.max(1));
        if needed > self.remaining() {
            return Err(DecodeError::BufferTooShort {
                ty: ty.to_string(),
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    /// Decode one value of `ty`
    pub(crate) fn decode(&mut self, ty: &IdlType, layout: Layout) -> Result<Value> {
        match ty {
            IdlType::Primitive(p) => self.primitive(*p, layout),
            IdlType::Vec { vec: inner } => {
                let min = min_size(self.registry, inner, layout);
                let len = self.read_len(layout, min, ty)?;
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.decode(inner, layout)?);
                }
                Ok(Value::Vec(items))
            }
            IdlType::Option { option: inner } => {
                let at = self.offset;
                let tag = self.take_array::<1>(ty)?[0];
                self.option_body(tag as u32, at, inner, ty, layout)
            }
            IdlType::COption { coption: inner } => {
                let at = self.offset;
                let tag = u32::from_le_bytes(self.take_array(ty)?);
                self.option_body(tag, at, inner, ty, layout)
            }
            IdlType::Array { array } => {
                let (inner, len) = (&array.0, array.1);
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.decode(inner, layout)?);
                }
                Ok(Value::Array(items))
            }
            IdlType::Defined { defined } => self.defined(defined.name()),
        }
    }

    fn option_body(
        &mut self,
        tag: u32,
        at: usize,
        inner: &IdlType,
        ty: &IdlType,
        layout: Layout,
    ) -> Result<Value> {
        match tag {
            0 => Ok(Value::Option(None)),
            1 => Ok(Value::some(self.decode(inner, layout)?)),
            _ => Err(DecodeError::InvalidOptionTag {
                tag,
                ty: ty.to_string(),
                offset: at,
            }
            .into()),
        }
    }

    fn primitive(&mut self, p: IdlPrimitive, layout: Layout) -> Result<Value> {
        Ok(match p {
            IdlPrimitive::Bool => {
                let at = self.offset;
                match self.take_array::<1>(&p)?[0] {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    byte => return Err(DecodeError::InvalidBool { byte, offset: at }.into()),
                }
            }
            IdlPrimitive::U8 => Value::U8(self.take_array::<1>(&p)?[0]),
            IdlPrimitive::I8 => Value::I8(i8::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::U16 => Value::U16(u16::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::I16 => Value::I16(i16::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::U32 => Value::U32(u32::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::I32 => Value::I32(i32::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::U64 => Value::U64(u64::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::I64 => Value::I64(i64::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::U128 => Value::U128(u128::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::I128 => Value::I128(i128::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::F32 => Value::F32(f32::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::F64 => Value::F64(f64::from_le_bytes(self.take_array(&p)?)),
            IdlPrimitive::Pubkey => Value::Pubkey(Pubkey::new_from_array(self.take_array(&p)?)),
            IdlPrimitive::String => {
                let len = self.read_len(layout, 1, &p)?;
                let at = self.offset;
                let bytes = self.take(len, &p)?;
                let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    ty: p.to_string(),
                    offset: at,
                })?;
                Value::String(s.to_string())
            }
            IdlPrimitive::Bytes => {
                let len = self.read_len(layout, 1, &p)?;
                Value::Bytes(self.take(len, &p)?.to_vec())
            }
        })
    }

    fn defined(&mut self, name: &str) -> Result<Value> {
        if self.depth >= MAX_DECODE_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                ty: name.to_string(),
                offset: self.offset,
                limit: MAX_DECODE_DEPTH,
            }
            .into());
        }
        self.depth += 1;
        let value = self.defined_body(name);
        self.depth -= 1;
        value
    }

    fn defined_body(&mut self, name: &str) -> Result<Value> {
        let registry = self.registry;
        let def = registry.type_def(name)?;
        let layout = Layout::of(def);

        match &def.ty {
            IdlTypeDefTy::Struct { fields: None } => Ok(Value::Struct(Vec::new())),
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Named(fields)),
            } => {
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    out.push((field.name.clone(), self.decode(&field.ty, layout)?));
                }
                Ok(Value::Struct(out))
            }
            IdlTypeDefTy::Struct {
                fields: Some(IdlDefinedFields::Tuple(types)),
            } => {
                let mut out = Vec::with_capacity(types.len());
                for ty in types {
                    out.push(self.decode(ty, layout)?);
                }
                Ok(Value::Tuple(out))
            }
            IdlTypeDefTy::Enum { variants } => {
                let at = self.offset;
                let index = self.read_width(layout.tag, &name)?;
                let variant = variants.get(index as usize).ok_or_else(|| DecodeError::InvalidEnumTag {
                    index,
                    ty: name.to_string(),
                    offset: at,
                })?;
                let fields = match &variant.fields {
                    None => EnumFields::Unit,
                    Some(IdlDefinedFields::Named(fields)) => {
                        let mut out = Vec::with_capacity(fields.len());
                        for field in fields {
                            out.push((field.name.clone(), self.decode(&field.ty, layout)?));
                        }
                        EnumFields::Named(out)
                    }
                    Some(IdlDefinedFields::Tuple(types)) => {
                        let mut out = Vec::with_capacity(types.len());
                        for ty in types {
                            out.push(self.decode(ty, layout)?);
                        }
                        EnumFields::Tuple(out)
                    }
                };
                Ok(Value::Enum {
                    variant: variant.name.clone(),
                    fields,
                })
            }
        }
    }
}

/// Smallest possible encoding of `ty`, used to reject absurd length prefixes
pub(crate) fn min_size(registry: &Registry, ty: &IdlType, layout: Layout) -> usize {
    min_size_bounded(registry, ty, layout, 0)
}

fn min_size_bounded(registry: &Registry, ty: &IdlType, layout: Layout, depth: usize) -> usize {
    // Deep enough to never matter for a pre-allocation check
    if depth > 16 {
        return 0;
    }
    match ty {
        IdlType::Primitive(p) => p.fixed_size().unwrap_or(layout.prefix.bytes()),
        IdlType::Vec { .. } => layout.prefix.bytes(),
        IdlType::Option { .. } => 1,
        IdlType::COption { .. } => 4,
        IdlType::Array { array } => {
            min_size_bounded(registry, &array.0, layout, depth + 1).saturating_mul(array.1)
        }
        IdlType::Defined { defined } => {
            let Ok(def) = registry.type_def(defined.name()) else {
                return 0;
            };
            let inner = Layout::of(def);
            let sum = |fields: &Option<IdlDefinedFields>| {
                fields.as_ref().map_or(0, |f| {
                    f.types()
                        .into_iter()
                        .map(|t| min_size_bounded(registry, t, inner, depth + 1))
                        .fold(0usize, usize::saturating_add)
                })
            };
            match &def.ty {
                IdlTypeDefTy::Struct { fields } => sum(fields),
                IdlTypeDefTy::Enum { variants } => {
                    inner.tag.bytes()
                        + variants.iter().map(|v| sum(&v.fields)).min().unwrap_or(0)
                }
            }
        }
    }
}
