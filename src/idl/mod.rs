//! # Anchor IDL Document
//!
//! Serde model of the interface schema consumed by the registry. Both the
//! current (0.30+) and the legacy Anchor spellings are accepted:
//!
//! ```json
//! {
//!   "address": "...",
//!   "metadata": { "name": "counter", "version": "0.1.0" },
//!   "instructions": [...],
//!   "accounts": [...],
//!   "types": [...],
//!   "events": [...],
//!   "errors": [...],
//!   "constants": [...]
//! }
//! ```
//!
//! The document is plain data. Reference integrity, discriminator uniqueness and
//! the other load-time invariants are checked by [`Registry`](crate::registry::Registry).

pub mod instruction;
pub mod types;

pub use instruction::{
    IdlAssociated, IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem,
    IdlInstructionAccounts, IdlPda, IdlRelation, IdlSeed,
};
pub use types::{
    IdlDefinedFields, IdlDefinedRef, IdlEnumVariant, IdlField, IdlPrimitive, IdlType, IdlTypeDef,
    IdlTypeDefTy, IntWidth,
};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SchemaError};

/// Anchor IDL structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idl {
    /// Deployed program address (base58)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Program metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IdlMetadata>,
    /// Program name (legacy top-level field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// IDL version (legacy top-level field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional documentation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// List of program instructions/entry points
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
    /// Account (record) definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccountDef>,
    /// Custom type definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<IdlTypeDef>,
    /// Event definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<IdlEvent>,
    /// Error code definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IdlErrorCode>,
    /// Named constants
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<IdlConst>,
}

/// Program metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlMetadata {
    /// Program name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Program version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// IDL spec version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    /// Deployed program address (legacy location)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Account (record) definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlAccountDef {
    /// Record type name
    pub name: String,
    /// Discriminator; `sha256("account:<name>")[..8]` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
    /// Inline body (legacy); otherwise the `types[]` entry of the same name
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<IdlTypeDefTy>,
}

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlEvent {
    /// Event name
    pub name: String,
    /// Discriminator; `sha256("event:<name>")[..8]` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
    /// Inline fields (legacy); otherwise the `types[]` entry of the same name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<IdlField>>,
}

/// Error definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlErrorCode {
    /// Error code (typically 6000+ for custom errors)
    pub code: u32,
    /// Error name (PascalCase)
    pub name: String,
    /// Optional error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Constant definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlConst {
    /// Constant name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: IdlType,
    /// Value as written in source
    pub value: String,
}

impl Idl {
    /// Load IDL from JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::Parse(format!("Failed to read IDL file {}: {}", path.display(), e))
        })?;

        Self::parse(&contents)
    }

    /// Parse IDL from JSON string
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SchemaError::Parse(format!("Failed to parse IDL JSON: {}", e)).into())
    }

    /// Program name from metadata, falling back to the legacy field
    pub fn program_name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("unknown")
    }

    /// Program address from the top level, falling back to legacy metadata
    pub fn program_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.metadata.as_ref().and_then(|m| m.address.as_deref()))
    }
}
