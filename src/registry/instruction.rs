//! Compiled instruction definitions
//!
//! The IDL's account tree is flattened into an ordered slot list once, at load
//! time, with every address parsed and every constant seed serialized, so the
//! resolver only ever deals with slot names, argument paths and raw bytes.

use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use super::constants::{integer_bytes, ConstDef};
use crate::error::SchemaError;
use crate::idl::{
    IdlField, IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem, IdlPrimitive,
    IdlRelation, IdlSeed, IdlType,
};

/// An instruction with its account tree flattened into slots
#[derive(Debug, Clone)]
pub struct InstructionDef {
    /// Instruction name as declared
    pub name: String,
    /// Discriminator prepended to the argument encoding
    pub discriminator: Vec<u8>,
    /// Arguments in encoding order
    pub args: Vec<IdlField>,
    /// Account slots in declaration order
    pub accounts: Vec<AccountConstraint>,
    /// Declared return type
    pub returns: Option<IdlType>,
}

impl InstructionDef {
    /// Slot by name
    pub fn account(&self, name: &str) -> Option<&AccountConstraint> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// Argument by name
    pub fn arg(&self, name: &str) -> Option<&IdlField> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// A single account slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConstraint {
    /// Slot name
    pub name: String,
    /// Enclosing group names, outermost first
    pub groups: Vec<String>,
    /// Whether the account is writable
    pub writable: bool,
    /// Whether the account signs
    pub signer: bool,
    /// Whether the account may be omitted
    pub optional: bool,
    /// How the address is derived, if it is
    pub derivation: Option<Derivation>,
    /// Pass-through relation, if any
    pub relation: Option<Relation>,
}

/// Derivation spec for a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Program-derived address
    Pda {
        /// Ordered seeds
        seeds: Vec<Seed>,
        /// Owner program; the schema's program when `None`
        program: Option<Seed>,
    },
    /// Associated token account of `wallet` for `mint`
    Associated {
        /// Wallet slot
        wallet: String,
        /// Mint slot
        mint: String,
        /// Token program slot; SPL Token when `None`
        token_program: Option<String>,
    },
}

/// Pass-through relation for a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Same address as another slot
    Slot(String),
    /// A fixed address
    Address(Pubkey),
    /// The schema's own program
    Program,
}

/// One compiled seed component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Literal bytes
    Bytes(Vec<u8>),
    /// Literal number, already serialized at its declared width
    Number {
        /// Declared width
        ty: IdlPrimitive,
        /// Little-endian bytes
        bytes: Vec<u8>,
    },
    /// A slot's address
    AccountKey(String),
    /// A field of a slot's record data
    AccountField {
        /// Slot holding the record
        slot: String,
        /// Dotted field path inside the record
        path: String,
        /// Record type name, when declared
        record: Option<String>,
    },
    /// An instruction argument (or a field of one)
    Arg {
        /// Argument name
        name: String,
        /// Dotted path inside the argument, empty for the whole argument
        path: String,
    },
    /// A named schema constant
    Constant {
        /// Constant name
        name: String,
        /// Serialized value
        bytes: Vec<u8>,
    },
    /// Another program's address
    Program(Pubkey),
}

impl Seed {
    /// The slot this seed waits on, if any
    pub fn slot_dependency(&self) -> Option<&str> {
        match self {
            Seed::AccountKey(slot) => Some(slot),
            Seed::AccountField { slot, .. } => Some(slot),
            _ => None,
        }
    }
}

/// Flatten and compile an IDL instruction
pub(crate) fn compile_instruction(
    ix: &IdlInstruction,
    discriminator: Vec<u8>,
    constants: &HashMap<String, ConstDef>,
) -> Result<InstructionDef, SchemaError> {
    let mut flat = Vec::new();
    flatten(&ix.accounts, &mut Vec::new(), &mut flat);

    let mut seen = HashSet::new();
    for (account, _) in &flat {
        if !seen.insert(account.name.as_str()) {
            return Err(SchemaError::DuplicateSlot {
                instruction: ix.name.clone(),
                slot: account.name.clone(),
            });
        }
    }

    let compiler = SlotCompiler {
        instruction: ix,
        slots: &seen,
        constants,
    };
    let accounts = flat
        .iter()
        .map(|(account, groups)| compiler.compile(account, groups.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstructionDef {
        name: ix.name.clone(),
        discriminator,
        args: ix.args.clone(),
        accounts,
        returns: ix.returns.clone(),
    })
}

/// Depth-first, declaration-order flattening of the account tree
fn flatten<'a>(
    items: &'a [IdlInstructionAccountItem],
    groups: &mut Vec<String>,
    out: &mut Vec<(&'a IdlInstructionAccount, Vec<String>)>,
) {
    for item in items {
        match item {
            IdlInstructionAccountItem::Single(account) => out.push((account, groups.clone())),
            IdlInstructionAccountItem::Composite(group) => {
                groups.push(group.name.clone());
                flatten(&group.accounts, groups, out);
                groups.pop();
            }
        }
    }
}

struct SlotCompiler<'a> {
    instruction: &'a IdlInstruction,
    slots: &'a HashSet<&'a str>,
    constants: &'a HashMap<String, ConstDef>,
}

impl SlotCompiler<'_> {
    fn invalid(&self, slot: &str, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidAccountSpec {
            instruction: self.instruction.name.clone(),
            slot: slot.to_string(),
            reason: reason.into(),
        }
    }

    fn compile(
        &self,
        account: &IdlInstructionAccount,
        groups: Vec<String>,
    ) -> Result<AccountConstraint, SchemaError> {
        let derivation = if let Some(pda) = &account.pda {
            let seeds = pda
                .seeds
                .iter()
                .map(|s| self.seed(&account.name, s))
                .collect::<Result<Vec<_>, _>>()?;
            let program = pda
                .program
                .as_ref()
                .map(|s| self.seed(&account.name, s))
                .transpose()?;
            Some(Derivation::Pda { seeds, program })
        } else if let Some(assoc) = &account.associated {
            for slot in [Some(&assoc.wallet), Some(&assoc.mint), assoc.token_program.as_ref()]
                .into_iter()
                .flatten()
            {
                self.require_slot(&account.name, slot)?;
            }
            Some(Derivation::Associated {
                wallet: assoc.wallet.clone(),
                mint: assoc.mint.clone(),
                token_program: assoc.token_program.clone(),
            })
        } else {
            None
        };

        let relation = if let Some(address) = &account.address {
            Some(Relation::Address(parse_address(
                address,
                &format!("account `{}`", account.name),
            )?))
        } else {
            match &account.relation {
                Some(IdlRelation::Account { path }) => {
                    self.require_slot(&account.name, path)?;
                    if path == &account.name {
                        return Err(self.invalid(&account.name, "relation refers to itself"));
                    }
                    Some(Relation::Slot(path.clone()))
                }
                Some(IdlRelation::Program) => Some(Relation::Program),
                None => None,
            }
        };

        Ok(AccountConstraint {
            name: account.name.clone(),
            groups,
            writable: account.writable,
            signer: account.signer,
            optional: account.optional,
            derivation,
            relation,
        })
    }

    fn require_slot(&self, slot: &str, target: &str) -> Result<(), SchemaError> {
        if self.slots.contains(target) {
            Ok(())
        } else {
            Err(self.invalid(slot, format!("unknown account `{}`", target)))
        }
    }

    fn seed(&self, slot: &str, seed: &IdlSeed) -> Result<Seed, SchemaError> {
        Ok(match seed {
            IdlSeed::Const { value } => Seed::Bytes(value.clone()),
            IdlSeed::Number { ty, value } => {
                let IdlType::Primitive(prim) = ty else {
                    return Err(self.invalid(slot, format!("number seed has type {}", ty)));
                };
                let raw = match value {
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::String(s) => s.clone(),
                    other => {
                        return Err(self.invalid(slot, format!("number seed value {}", other)))
                    }
                };
                let bytes = integer_bytes(*prim, &raw).map_err(|e| self.invalid(slot, e))?;
                Seed::Number { ty: *prim, bytes }
            }
            IdlSeed::Account { path, account } => {
                let (target, rest) = split_path(path);
                self.require_slot(slot, target)?;
                if rest.is_empty() {
                    Seed::AccountKey(target.to_string())
                } else {
                    Seed::AccountField {
                        slot: target.to_string(),
                        path: rest.to_string(),
                        record: account.clone(),
                    }
                }
            }
            IdlSeed::Arg { path } => {
                let (name, rest) = split_path(path);
                if !self.instruction.args.iter().any(|a| a.name == name) {
                    return Err(self.invalid(slot, format!("unknown argument `{}`", name)));
                }
                Seed::Arg {
                    name: name.to_string(),
                    path: rest.to_string(),
                }
            }
            IdlSeed::Constant { name } => {
                let def =
                    self.constants
                        .get(name)
                        .ok_or_else(|| SchemaError::UnresolvedConstant {
                            name: name.clone(),
                            referenced_from: format!(
                                "seed of account `{}` in instruction `{}`",
                                slot, self.instruction.name
                            ),
                        })?;
                Seed::Constant {
                    name: name.clone(),
                    bytes: def.bytes.clone(),
                }
            }
            IdlSeed::Program { address } => {
                Seed::Program(parse_address(address, &format!("seed of account `{}`", slot))?)
            }
        })
    }
}

/// Split `head.rest.of.path` into `("head", "rest.of.path")`
fn split_path(path: &str) -> (&str, &str) {
    path.split_once('.').unwrap_or((path, ""))
}

/// Parse a base58 address from the schema
pub(crate) fn parse_address(value: &str, context: &str) -> Result<Pubkey, SchemaError> {
    Pubkey::from_str(value).map_err(|_| SchemaError::InvalidAddress {
        value: value.to_string(),
        context: context.to_string(),
    })
}
