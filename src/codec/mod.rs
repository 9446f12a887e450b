//! # Binary Codec
//!
//! Type-directed encoder and decoder for the little-endian, prefix-length wire
//! format used by on-chain programs:
//!
//! - integers and floats are fixed-width little-endian, `bool` is one byte
//! - `string`, `bytes` and `vec<T>` carry a length prefix (u32 unless the
//!   enclosing type definition declares `lengthPrefix`)
//! - `option<T>` has a one-byte tag, `coption<T>` a four-byte tag
//! - `[T; N]` is N elements with no prefix
//! - enums carry a variant index tag (u8 unless the type declares `tagWidth`)
//! - records, instructions and events are prefixed with their discriminator
//!
//! A [`Codec`] only reads the [`Registry`] it wraps, so one instance can be
//! shared between any number of threads.
//!
//! ```ignore
//! let codec = Codec::new(Arc::new(Registry::from_json(&idl_json)?));
//! let bytes = codec.encode_account("Counter", &Value::structure([("count", Value::U64(7))]))?;
//! let (counter, used) = codec.decode_account("Counter", &bytes)?;
//! ```

mod batch;
mod decode;
mod encode;
mod json;

pub use batch::ParallelConfig;
pub use decode::MAX_DECODE_DEPTH;
pub(crate) use json::read_json;

use std::sync::Arc;

use crate::error::{DecodeError, Result};
use crate::idl::{IdlType, IdlTypeDef, IntWidth};
use crate::registry::{InstructionDef, RecordDef, Registry, DISCRIMINATOR_LEN};
use crate::value::Value;
use decode::Decoder;
use encode::Encoder;

/// Prefix and tag widths in force while coding the fields of one type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) prefix: IntWidth,
    pub(crate) tag: IntWidth,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            prefix: IntWidth::U32,
            tag: IntWidth::U8,
        }
    }
}

impl Layout {
    /// Widths declared by a type definition
    pub(crate) fn of(def: &IdlTypeDef) -> Self {
        Self {
            prefix: def.length_prefix.unwrap_or_default(),
            tag: def.tag_width.unwrap_or(IntWidth::U8),
        }
    }
}

/// An instruction recovered from its encoded data
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction {
    /// Instruction name
    pub name: String,
    /// Arguments as a struct value, in declaration order
    pub args: Value,
}

/// An event recovered from its encoded payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// Event body
    pub data: Value,
}

/// Encoder/decoder bound to one schema
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<Registry>,
}

impl Codec {
    /// Create a codec over a validated registry
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this codec reads
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Encode a value of the named type
    pub fn encode(&self, type_name: &str, value: &Value) -> Result<Vec<u8>> {
        self.registry.type_def(type_name)?;
        self.encode_type(&IdlType::defined(type_name), value)
    }

    /// Decode a value of the named type, returning it with the bytes consumed
    ///
    /// Bytes after the value are left unread.
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<(Value, usize)> {
        self.registry.type_def(type_name)?;
        self.decode_type(&IdlType::defined(type_name), data)
    }

    /// Decode a value of the named type, rejecting trailing bytes
    pub fn decode_exact(&self, type_name: &str, data: &[u8]) -> Result<Value> {
        let (value, used) = self.decode(type_name, data)?;
        if used != data.len() {
            return Err(DecodeError::TrailingBytes {
                ty: type_name.to_string(),
                remaining: data.len() - used,
            }
            .into());
        }
        Ok(value)
    }

    /// Encode a value of an arbitrary type expression
    pub fn encode_type(&self, ty: &IdlType, value: &Value) -> Result<Vec<u8>> {
        let mut encoder = Encoder::new(&self.registry);
        encoder.encode(ty, value, Layout::default())?;
        Ok(encoder.finish())
    }

    /// Decode a value of an arbitrary type expression
    pub fn decode_type(&self, ty: &IdlType, data: &[u8]) -> Result<(Value, usize)> {
        let mut decoder = Decoder::new(&self.registry, data);
        let value = decoder.decode(ty, Layout::default())?;
        Ok((value, decoder.offset()))
    }

    /// Discriminator of the named record
    pub fn account_discriminator(&self, name: &str) -> Result<&[u8]> {
        Ok(&self.registry.account(name)?.discriminator)
    }

    /// Encode a record: discriminator followed by the body
    pub fn encode_account(&self, name: &str, value: &Value) -> Result<Vec<u8>> {
        let record = self.registry.account(name)?;
        self.encode_record(record, value)
    }

    /// Decode a record after checking its discriminator
    ///
    /// Returns the body and the bytes consumed, discriminator included.
    /// Over-allocated account buffers are accepted.
    pub fn decode_account(&self, name: &str, data: &[u8]) -> Result<(Value, usize)> {
        let record = self.registry.account(name)?;
        self.decode_record("account", record, data)
    }

    /// Record type whose discriminator prefixes `data`
    pub fn identify_account(&self, data: &[u8]) -> Option<&RecordDef> {
        self.registry.account_by_discriminator(data)
    }

    /// Identify and decode a record of any type
    pub fn decode_any_account(&self, data: &[u8]) -> Result<(String, Value)> {
        let record = self.identify_account(data).ok_or_else(|| DecodeError::UnknownDiscriminator {
            kind: "account".to_string(),
            found: prefix_hex(data, DISCRIMINATOR_LEN),
            expected: None,
        })?;
        let (value, _) = self.decode_record("account", record, data)?;
        Ok((record.name.clone(), value))
    }

    /// Encode instruction data: discriminator followed by the argument tuple
    ///
    /// `args` must be a struct value naming every declared argument.
    pub fn encode_instruction(&self, name: &str, args: &Value) -> Result<Vec<u8>> {
        let ix = self.registry.instruction(name)?;
        let mut encoder = Encoder::new(&self.registry);
        encoder.raw(&ix.discriminator);
        encoder.args(&ix.args, args)?;
        Ok(encoder.finish())
    }

    /// Identify an instruction by discriminator and decode its arguments
    pub fn decode_instruction(&self, data: &[u8]) -> Result<DecodedInstruction> {
        let ix = self
            .registry
            .instruction_by_discriminator(data)
            .ok_or_else(|| DecodeError::UnknownDiscriminator {
                kind: "instruction".to_string(),
                found: prefix_hex(data, DISCRIMINATOR_LEN),
                expected: None,
            })?;
        let args = self.decode_args(ix, data)?;
        Ok(DecodedInstruction {
            name: ix.name.clone(),
            args,
        })
    }

    fn decode_args(&self, ix: &InstructionDef, data: &[u8]) -> Result<Value> {
        let mut decoder = Decoder::starting_at(&self.registry, data, ix.discriminator.len());
        let mut fields = Vec::with_capacity(ix.args.len());
        for arg in &ix.args {
            fields.push((arg.name.clone(), decoder.decode(&arg.ty, Layout::default())?));
        }
        Ok(Value::Struct(fields))
    }

    /// Encode an event payload: discriminator followed by the body
    pub fn encode_event(&self, name: &str, value: &Value) -> Result<Vec<u8>> {
        let record = self.registry.event(name)?;
        self.encode_record(record, value)
    }

    /// Identify an event by discriminator and decode it
    pub fn decode_event(&self, data: &[u8]) -> Result<DecodedEvent> {
        let record = self
            .registry
            .event_by_discriminator(data)
            .ok_or_else(|| DecodeError::UnknownDiscriminator {
                kind: "event".to_string(),
                found: prefix_hex(data, DISCRIMINATOR_LEN),
                expected: None,
            })?;
        let (data, _) = self.decode_record("event", record, data)?;
        Ok(DecodedEvent {
            name: record.name.clone(),
            data,
        })
    }

    /// Decode the return data of an instruction
    ///
    /// `Ok(None)` when the instruction declares no return type.
    pub fn decode_return(&self, instruction: &str, data: &[u8]) -> Result<Option<Value>> {
        let ix = self.registry.instruction(instruction)?;
        match &ix.returns {
            Some(ty) => Ok(Some(self.decode_type(ty, data)?.0)),
            None => Ok(None),
        }
    }

    fn encode_record(&self, record: &RecordDef, value: &Value) -> Result<Vec<u8>> {
        let mut encoder = Encoder::new(&self.registry);
        encoder.raw(&record.discriminator);
        encoder.encode(&IdlType::defined(record.name.as_str()), value, Layout::default())?;
        Ok(encoder.finish())
    }

    fn decode_record(&self, kind: &str, record: &RecordDef, data: &[u8]) -> Result<(Value, usize)> {
        let disc = &record.discriminator;
        if data.len() < disc.len() {
            return Err(DecodeError::BufferTooShort {
                ty: record.name.clone(),
                offset: 0,
                needed: disc.len(),
                remaining: data.len(),
            }
            .into());
        }
        if !data.starts_with(disc) {
            tracing::debug!(
                record = %record.name,
                found = %hex::encode(&data[..disc.len()]),
                "Discriminator mismatch"
            );
            return Err(DecodeError::UnknownDiscriminator {
                kind: format!("{} {}", kind, record.name),
                found: hex::encode(&data[..disc.len()]),
                expected: Some(hex::encode(disc)),
            }
            .into());
        }

        let mut decoder = Decoder::starting_at(&self.registry, data, disc.len());
        let value = decoder.decode(&IdlType::defined(record.name.as_str()), Layout::default())?;
        Ok((value, decoder.offset()))
    }
}

fn prefix_hex(data: &[u8], len: usize) -> String {
    hex::encode(&data[..data.len().min(len)])
}
