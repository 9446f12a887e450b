//! Instruction definitions and their account-requirement trees

use serde::{Deserialize, Serialize};

use super::types::{IdlField, IdlType};

/// Instruction definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlInstruction {
    /// Instruction name
    pub name: String,
    /// Optional documentation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Instruction discriminator bytes; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
    /// Required accounts for this instruction
    #[serde(default)]
    pub accounts: Vec<IdlInstructionAccountItem>,
    /// Instruction arguments, encoded in order after the discriminator
    #[serde(default)]
    pub args: Vec<IdlField>,
    /// Declared return type (decoded from return data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<IdlType>,
}

/// One node of an instruction's account tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlInstructionAccountItem {
    /// Named group of nested requirements
    Composite(IdlInstructionAccounts),
    /// Single account slot
    Single(IdlInstructionAccount),
}

impl IdlInstructionAccountItem {
    /// Name of the slot or group
    pub fn name(&self) -> &str {
        match self {
            IdlInstructionAccountItem::Composite(group) => &group.name,
            IdlInstructionAccountItem::Single(account) => &account.name,
        }
    }
}

/// Named group of account requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlInstructionAccounts {
    /// Group name
    pub name: String,
    /// Nested requirements
    pub accounts: Vec<IdlInstructionAccountItem>,
}

/// A single account constraint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlInstructionAccount {
    /// Account slot name
    pub name: String,
    /// Optional documentation for this account
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Whether the account is mutable (writable)
    #[serde(default, alias = "isMut")]
    pub writable: bool,
    /// Whether the account must sign the transaction
    #[serde(default, alias = "isSigner")]
    pub signer: bool,
    /// Whether the account may be omitted
    #[serde(default, alias = "isOptional")]
    pub optional: bool,
    /// Fixed address (base58)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Program-derived address spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pda: Option<IdlPda>,
    /// Associated token account spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated: Option<IdlAssociated>,
    /// Pass-through relation to another slot or the program itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<IdlRelation>,
}

/// Program-derived address spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlPda {
    /// Ordered seed components
    pub seeds: Vec<IdlSeed>,
    /// Owner program; the schema's own program when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<IdlSeed>,
}

/// One seed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlSeed {
    /// Literal bytes, used verbatim
    Const {
        /// Seed bytes
        value: Vec<u8>,
    },
    /// Literal number, serialized at the declared width
    Number {
        /// Integer primitive giving the width
        #[serde(rename = "type")]
        ty: IdlType,
        /// Number (or decimal string for 128-bit values)
        value: serde_json::Value,
    },
    /// A slot's address (`path` = slot) or a field of its record data (`path` = `slot.field`)
    Account {
        /// Slot name, optionally followed by a dotted field path
        path: String,
        /// Record type of the slot's data, for field paths
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
    },
    /// An instruction argument (`path` = `arg` or `arg.field`)
    Arg {
        /// Argument name, optionally followed by a dotted field path
        path: String,
    },
    /// A constant declared in the schema's `constants[]`
    Constant {
        /// Constant name
        name: String,
    },
    /// The address of another program
    Program {
        /// Base58 program address
        address: String,
    },
}

/// Associated token account spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAssociated {
    /// Slot holding the owning wallet
    pub wallet: String,
    /// Slot holding the mint
    pub mint: String,
    /// Slot holding the token program (SPL Token when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_program: Option<String>,
}

/// Pass-through relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlRelation {
    /// Same address as another slot
    Account {
        /// Slot name
        path: String,
    },
    /// The schema's own program address
    Program,
}
