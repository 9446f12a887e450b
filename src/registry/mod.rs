//! # Type Registry
//!
//! Built once from an [`Idl`] and immutable afterwards. Construction validates
//! the whole schema (reference integrity, direct self-reference, duplicate
//! names, discriminators and slots) so that a `Registry` that exists is always
//! safe to encode and decode against. Share it behind an `Arc`; every lookup
//! takes `&self`.
//!
//! ```ignore
//! use solidl::{Idl, Registry};
//!
//! let registry = Registry::new(Idl::load("target/idl/counter.json")?)?;
//! let counter = registry.account("Counter")?;
//! ```

pub mod constants;
pub mod discriminator;
pub mod instruction;
mod validate;

pub use constants::ConstDef;
pub use discriminator::{instruction_discriminator, sighash, to_snake_case, DISCRIMINATOR_LEN};
pub use instruction::{AccountConstraint, Derivation, InstructionDef, Relation, Seed};

use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result, SchemaError};
use crate::idl::{Idl, IdlDefinedFields, IdlErrorCode, IdlTypeDef, IdlTypeDefTy};
use discriminator::{ACCOUNT_NAMESPACE, EVENT_NAMESPACE};

/// A discriminator-prefixed record (account or event) layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDef {
    /// Record name; also the name of its body in the type table
    pub name: String,
    /// Leading discriminator bytes
    pub discriminator: Vec<u8>,
}

/// Validated, indexed view of a schema
#[derive(Debug, Clone)]
pub struct Registry {
    idl: Idl,
    program_id: Option<Pubkey>,
    types: HashMap<String, IdlTypeDef>,
    accounts: Vec<RecordDef>,
    events: Vec<RecordDef>,
    instructions: Vec<InstructionDef>,
    constants: HashMap<String, ConstDef>,
    errors: HashMap<u32, IdlErrorCode>,
}

impl Registry {
    /// Build and validate a registry from a parsed IDL
    pub fn new(idl: Idl) -> Result<Self> {
        let mut types: HashMap<String, IdlTypeDef> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for def in &idl.types {
            if types.insert(def.name.clone(), def.clone()).is_some() {
                return Err(SchemaError::DuplicateName {
                    kind: "type",
                    name: def.name.clone(),
                }
                .into());
            }
            order.push(def.name.clone());
        }

        // Legacy IDLs carry record and event bodies inline
        for account in &idl.accounts {
            if let Some(ty) = &account.ty {
                if !types.contains_key(&account.name) {
                    types.insert(account.name.clone(), inline_def(&account.name, ty.clone()));
                    order.push(account.name.clone());
                }
            }
        }
        for event in &idl.events {
            if let Some(fields) = &event.fields {
                if !types.contains_key(&event.name) {
                    let ty = IdlTypeDefTy::Struct {
                        fields: Some(IdlDefinedFields::Named(fields.clone())),
                    };
                    types.insert(event.name.clone(), inline_def(&event.name, ty));
                    order.push(event.name.clone());
                }
            }
        }

        for name in &order {
            validate::check_typedef_refs(&types[name], &types)?;
        }
        validate::check_cycles(&types, &order)?;

        let mut constants = HashMap::new();
        for def in &idl.constants {
            validate::check_type_refs(&def.ty, &types, &format!("constant `{}`", def.name))?;
            let parsed = ConstDef::parse(def)?;
            if constants.insert(def.name.clone(), parsed).is_some() {
                return Err(SchemaError::DuplicateName {
                    kind: "constant",
                    name: def.name.clone(),
                }
                .into());
            }
        }

        let accounts = records(
            "account",
            ACCOUNT_NAMESPACE,
            idl.accounts
                .iter()
                .map(|a| (a.name.as_str(), a.discriminator.as_ref())),
            &types,
        )?;
        let events = records(
            "event",
            EVENT_NAMESPACE,
            idl.events
                .iter()
                .map(|e| (e.name.as_str(), e.discriminator.as_ref())),
            &types,
        )?;

        let mut instructions = Vec::with_capacity(idl.instructions.len());
        for ix in &idl.instructions {
            for arg in &ix.args {
                validate::check_type_refs(
                    &arg.ty,
                    &types,
                    &format!("instruction `{}` argument `{}`", ix.name, arg.name),
                )?;
            }
            if let Some(returns) = &ix.returns {
                validate::check_type_refs(
                    returns,
                    &types,
                    &format!("instruction `{}` return type", ix.name),
                )?;
            }
            let disc = match &ix.discriminator {
                Some(d) => d.clone(),
                None => instruction_discriminator(&ix.name).to_vec(),
            };
            if disc.is_empty() {
                return Err(SchemaError::EmptyDiscriminator {
                    kind: "instruction",
                    name: ix.name.clone(),
                }
                .into());
            }
            instructions.push(instruction::compile_instruction(ix, disc, &constants)?);
        }
        check_unique(
            "instruction",
            instructions
                .iter()
                .map(|i| (i.name.as_str(), i.discriminator.as_slice())),
        )?;

        let program_id = idl
            .program_address()
            .map(|addr| instruction::parse_address(addr, "program address"))
            .transpose()?;

        let errors = idl.errors.iter().map(|e| (e.code, e.clone())).collect();

        tracing::debug!(
            program = idl.program_name(),
            types = types.len(),
            accounts = accounts.len(),
            events = events.len(),
            instructions = instructions.len(),
            "Loaded IDL registry"
        );

        Ok(Self {
            idl,
            program_id,
            types,
            accounts,
            events,
            instructions,
            constants,
            errors,
        })
    }

    /// Parse and validate an IDL JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(Idl::parse(json)?)
    }

    /// The underlying document
    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    /// Program address declared by the schema
    pub fn program_id(&self) -> Option<Pubkey> {
        self.program_id
    }

    /// Type definition by name
    pub fn type_def(&self, name: &str) -> Result<&IdlTypeDef> {
        self.types
            .get(name)
            .ok_or_else(|| Error::unknown("type", name))
    }

    /// Record (account) layout by name
    pub fn account(&self, name: &str) -> Result<&RecordDef> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::unknown("account", name))
    }

    /// All record layouts in declaration order
    pub fn accounts(&self) -> &[RecordDef] {
        &self.accounts
    }

    /// Event layout by name
    pub fn event(&self, name: &str) -> Result<&RecordDef> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::unknown("event", name))
    }

    /// All event layouts in declaration order
    pub fn events(&self) -> &[RecordDef] {
        &self.events
    }

    /// Instruction by name; `camelCase` and `snake_case` spellings both match
    pub fn instruction(&self, name: &str) -> Result<&InstructionDef> {
        self.instructions
            .iter()
            .find(|i| i.name == name)
            .or_else(|| {
                let wanted = to_snake_case(name);
                self.instructions
                    .iter()
                    .find(|i| to_snake_case(&i.name) == wanted)
            })
            .ok_or_else(|| Error::unknown("instruction", name))
    }

    /// All instructions in declaration order
    pub fn instructions(&self) -> &[InstructionDef] {
        &self.instructions
    }

    /// Constant by name
    pub fn constant(&self, name: &str) -> Result<&ConstDef> {
        self.constants
            .get(name)
            .ok_or_else(|| Error::unknown("constant", name))
    }

    /// Error definition by code
    pub fn find_error(&self, code: u32) -> Option<&IdlErrorCode> {
        self.errors.get(&code)
    }

    /// Record whose discriminator prefixes `data`
    pub fn account_by_discriminator(&self, data: &[u8]) -> Option<&RecordDef> {
        self.accounts
            .iter()
            .find(|a| data.starts_with(&a.discriminator))
    }

    /// Event whose discriminator prefixes `data`
    pub fn event_by_discriminator(&self, data: &[u8]) -> Option<&RecordDef> {
        self.events.iter().find(|e| data.starts_with(&e.discriminator))
    }

    /// Instruction whose discriminator prefixes `data`
    pub fn instruction_by_discriminator(&self, data: &[u8]) -> Option<&InstructionDef> {
        self.instructions
            .iter()
            .find(|i| data.starts_with(&i.discriminator))
    }
}

fn inline_def(name: &str, ty: IdlTypeDefTy) -> IdlTypeDef {
    IdlTypeDef {
        name: name.to_string(),
        docs: Vec::new(),
        length_prefix: None,
        tag_width: None,
        ty,
    }
}

/// Build record layouts, filling in name-derived discriminators
fn records<'a>(
    kind: &'static str,
    namespace: &str,
    defs: impl Iterator<Item = (&'a str, Option<&'a Vec<u8>>)>,
    types: &HashMap<String, IdlTypeDef>,
) -> Result<Vec<RecordDef>> {
    let mut out = Vec::new();
    for (name, disc) in defs {
        if !types.contains_key(name) {
            return Err(SchemaError::UnresolvedType {
                name: name.to_string(),
                referenced_from: format!("{} `{}`", kind, name),
            }
            .into());
        }
        let discriminator = match disc {
            Some(d) => d.clone(),
            None => sighash(namespace, name).to_vec(),
        };
        if discriminator.is_empty() {
            return Err(SchemaError::EmptyDiscriminator {
                kind,
                name: name.to_string(),
            }
            .into());
        }
        out.push(RecordDef {
            name: name.to_string(),
            discriminator,
        });
    }
    check_unique(
        kind,
        out.iter()
            .map(|r| (r.name.as_str(), r.discriminator.as_slice())),
    )?;
    Ok(out)
}

/// Reject duplicate names and discriminators within one kind
///
/// Lookup matches by prefix, so a discriminator that starts another one of
/// the same kind is rejected too.
fn check_unique<'a>(
    kind: &'static str,
    entries: impl Iterator<Item = (&'a str, &'a [u8])>,
) -> Result<()> {
    let mut names: HashSet<&str> = HashSet::new();
    let mut discs: HashMap<&[u8], &str> = HashMap::new();
    let mut seen: Vec<(&str, &[u8])> = Vec::new();
    for (name, disc) in entries {
        if !names.insert(name) {
            return Err(SchemaError::DuplicateName {
                kind,
                name: name.to_string(),
            }
            .into());
        }
        if let Some(first) = discs.insert(disc, name) {
            return Err(SchemaError::DuplicateDiscriminator {
                kind,
                discriminator: hex::encode(disc),
                first: first.to_string(),
                second: name.to_string(),
            }
            .into());
        }
        for &(other, other_disc) in &seen {
            let (short, long) = if disc.len() < other_disc.len() {
                ((name, disc), (other, other_disc))
            } else {
                ((other, other_disc), (name, disc))
            };
            if short.1.len() < long.1.len() && long.1.starts_with(short.1) {
                return Err(SchemaError::AmbiguousDiscriminator {
                    kind,
                    prefix: hex::encode(short.1),
                    short: short.0.to_string(),
                    long: long.0.to_string(),
                }
                .into());
            }
        }
        seen.push((name, disc));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER_IDL: &str = r#"{
        "address": "11111111111111111111111111111111",
        "metadata": {"name": "counter", "version": "0.1.0"},
        "instructions": [
            {"name": "initDemo", "accounts": [{"name": "counter", "writable": true}],
             "args": [{"name": "start", "type": "u64"}]}
        ],
        "accounts": [{"name": "Counter"}],
        "types": [{"name": "Counter", "type": {"kind": "struct",
                   "fields": [{"name": "count", "type": "u64"}]}}],
        "errors": [{"code": 6000, "name": "Overflow", "msg": "Counter overflow"}]
    }"#;

    #[test]
    fn test_load_and_lookup() {
        let registry = Registry::from_json(COUNTER_IDL).unwrap();
        assert_eq!(registry.program_id(), Some(Pubkey::default()));
        assert_eq!(
            registry.account("Counter").unwrap().discriminator,
            sighash("account", "Counter").to_vec()
        );
        assert!(registry.instruction("init_demo").is_ok());
        assert_eq!(registry.find_error(6000).unwrap().name, "Overflow");
        assert!(matches!(
            registry.type_def("Nope"),
            Err(Error::UnknownName { kind: "type", .. })
        ));
    }

    #[test]
    fn test_legacy_inline_bodies() {
        let registry = Registry::from_json(
            r#"{"name": "legacy", "version": "0.1.0", "instructions": [],
                "accounts": [{"name": "State", "type": {"kind": "struct",
                              "fields": [{"name": "owner", "type": "publicKey"}]}}],
                "events": [{"name": "Moved", "fields": [{"name": "to", "type": "u8", "index": false}]}]}"#,
        )
        .unwrap();
        assert!(registry.type_def("State").is_ok());
        assert!(registry.type_def("Moved").is_ok());
        assert_eq!(
            registry.event("Moved").unwrap().discriminator,
            sighash("event", "Moved").to_vec()
        );
    }

    #[test]
    fn test_account_without_body_rejected() {
        let err = Registry::from_json(r#"{"instructions": [], "accounts": [{"name": "Ghost"}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::UnresolvedType { .. })
        ));
    }

    #[test]
    fn test_duplicate_discriminator_rejected() {
        let err = Registry::from_json(
            r#"{"instructions": [
                {"name": "a", "discriminator": [1], "accounts": [], "args": []},
                {"name": "b", "discriminator": [1], "accounts": [], "args": []}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::DuplicateDiscriminator { kind: "instruction", .. })
        ));
    }

    #[test]
    fn test_lookup_by_discriminator() {
        let registry = Registry::from_json(COUNTER_IDL).unwrap();
        let mut data = sighash("account", "Counter").to_vec();
        data.extend_from_slice(&7u64.to_le_bytes());
        assert_eq!(
            registry.account_by_discriminator(&data).map(|r| r.name.as_str()),
            Some("Counter")
        );
        assert!(registry.account_by_discriminator(&[0; 16]).is_none());
    }
}
