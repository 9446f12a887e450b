//! # Client Facade
//!
//! [`Program`] ties a schema to a program address. Its [`InstructionBuilder`]
//! encodes arguments, resolves accounts and produces a ready-to-send
//! [`Instruction`]; submission goes through a [`Transport`].
//!
//! ```rust,ignore
//! let program = Program::from_idl_json(&idl_json)?;
//! let ix = program
//!     .instruction("increment")?
//!     .args_json(&serde_json::json!({ "by": 2 }))?
//!     .account("authority", wallet.pubkey())
//!     .build()?;
//! ```

mod events;
mod transport;

pub use events::{parse_custom_error, EventParser, ParsedLogs};
#[cfg(feature = "rpc")]
pub use transport::RpcTransport;
pub use transport::Transport;

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::{ClientError, Error, Result};
use crate::registry::{Derivation, InstructionDef, Registry, Seed};
use crate::resolver::{AccountsResolver, ResolveInput, ResolvedAccounts, ResolverConfig};
use crate::value::Value;

/// Facade configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Account resolution settings
    pub resolver: ResolverConfig,
}

impl ProgramOptions {
    /// Replace the resolver configuration
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Enable or disable auto-filling of well-known program slots
    pub fn with_well_known_programs(mut self, enabled: bool) -> Self {
        self.resolver.well_known_programs = enabled;
        self
    }
}

/// A program described by a schema
#[derive(Debug, Clone)]
pub struct Program {
    registry: Arc<Registry>,
    codec: Codec,
    program_id: Pubkey,
    options: ProgramOptions,
}

impl Program {
    /// Program at the address declared in the schema
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let program_id = registry
            .program_id()
            .ok_or(ClientError::MissingProgramAddress)?;
        Ok(Self::with_program_id(registry, program_id))
    }

    /// Program at an explicit address, overriding the schema's
    pub fn with_program_id(registry: Arc<Registry>, program_id: Pubkey) -> Self {
        Self {
            codec: Codec::new(registry.clone()),
            registry,
            program_id,
            options: ProgramOptions::default(),
        }
    }

    /// Load a schema document and use its declared address
    pub fn from_idl_json(json: &str) -> Result<Self> {
        Self::new(Arc::new(Registry::from_json(json)?))
    }

    /// Replace the options
    pub fn with_options(mut self, options: ProgramOptions) -> Self {
        self.options = options;
        self
    }

    /// Program address
    pub fn id(&self) -> Pubkey {
        self.program_id
    }

    /// Schema registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Codec over the schema
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Current options
    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// Account resolver configured from the options
    pub fn resolver(&self) -> AccountsResolver {
        AccountsResolver::new(self.registry.clone(), self.program_id)
            .with_config(self.options.resolver.clone())
    }

    /// Log parser for this program's events
    pub fn event_parser(&self) -> EventParser {
        EventParser::new(self.program_id, self.codec.clone())
    }

    /// Start building a call to `name`
    pub fn instruction(&self, name: &str) -> Result<InstructionBuilder<'_>> {
        let def = self.registry.instruction(name)?;
        Ok(InstructionBuilder {
            program: self,
            def,
            input: ResolveInput::new(),
            remaining: Vec::new(),
        })
    }

    /// Fetch and decode the record of type `account_type` at `address`
    pub async fn fetch_account(
        &self,
        account_type: &str,
        address: &Pubkey,
        transport: &dyn Transport,
    ) -> Result<Value> {
        let data = transport.get_account_data(address).await?.ok_or_else(|| {
            ClientError::Transport {
                message: format!("account {} not found", address),
            }
        })?;
        let (value, _) = self.codec.decode_account(account_type, &data)?;
        Ok(value)
    }

    /// Map a transport failure carrying a custom program error to the schema's error entry
    pub fn map_program_error(&self, err: Error) -> Error {
        let code = match &err {
            Error::Client(ClientError::Transport { message }) => parse_custom_error(message),
            _ => None,
        };
        let Some(code) = code else {
            return err;
        };
        match self.registry.find_error(code) {
            Some(entry) => ClientError::Program {
                code,
                name: entry.name.clone(),
                msg: entry.msg.clone(),
            },
            None => ClientError::Program {
                code,
                name: format!("Custom({})", code),
                msg: None,
            },
        }
        .into()
    }
}

/// Builds one instruction of a [`Program`]
#[derive(Debug, Clone)]
pub struct InstructionBuilder<'p> {
    program: &'p Program,
    def: &'p InstructionDef,
    input: ResolveInput,
    remaining: Vec<AccountMeta>,
}

impl<'p> InstructionBuilder<'p> {
    /// Set the arguments as a struct value
    pub fn args(mut self, args: Value) -> Self {
        self.input.args = args;
        self
    }

    /// Set the arguments from a JSON object
    pub fn args_json(mut self, json: &serde_json::Value) -> Result<Self> {
        self.input.args = self.program.codec.args_from_json(&self.def.name, json)?;
        Ok(self)
    }

    /// Supply a slot's address
    pub fn account(mut self, slot: impl Into<String>, address: Pubkey) -> Self {
        self.input.addresses.insert(slot.into(), address);
        self
    }

    /// Supply a slot's decoded record, for seeds that read its fields
    pub fn account_data(mut self, slot: impl Into<String>, data: Value) -> Self {
        self.input.account_data.insert(slot.into(), data);
        self
    }

    /// Append accounts after the declared ones
    pub fn remaining_accounts(mut self, metas: impl IntoIterator<Item = AccountMeta>) -> Self {
        self.remaining.extend(metas);
        self
    }

    /// Resolve the declared accounts from what has been supplied
    pub fn resolve(&self) -> Result<ResolvedAccounts> {
        self.program
            .resolver()
            .resolve_instruction(self.def, &self.input)
    }

    /// Encode arguments and resolve accounts into an instruction
    pub fn build(&self) -> Result<Instruction> {
        let resolved = self.resolve()?;
        self.assemble(&resolved)
    }

    /// Like [`build`](Self::build), fetching record data that field seeds need
    ///
    /// Records are fetched only once the slot holding them has an address;
    /// each fetch can unlock further slots, so this repeats until nothing
    /// new is fetched.
    pub async fn build_with(&mut self, transport: &dyn Transport) -> Result<Instruction> {
        let resolved = self.resolve_with(transport).await?;
        self.assemble(&resolved)
    }

    /// Resolve accounts, fetching record data for field seeds as needed
    pub async fn resolve_with(&mut self, transport: &dyn Transport) -> Result<ResolvedAccounts> {
        let resolver = self.program.resolver();
        for _ in 0..resolver.config().max_depth {
            let partial = resolver.resolve_partial(&self.def.name, &self.input)?;
            let wanted = self.missing_records(&partial);
            if wanted.is_empty() {
                break;
            }

            let mut fetched = false;
            for (slot, address, record) in wanted {
                let Some(data) = transport.get_account_data(&address).await? else {
                    tracing::debug!(%slot, %address, "Seed account does not exist");
                    continue;
                };
                let value = match record {
                    Some(record) => self.program.codec.decode_account(&record, &data)?.0,
                    None => self.program.codec.decode_any_account(&data)?.1,
                };
                self.input.account_data.insert(slot, value);
                fetched = true;
            }
            if !fetched {
                break;
            }
        }
        resolver.resolve_instruction(self.def, &self.input)
    }

    /// Build, submit, and map custom program errors to schema entries
    pub async fn send(
        self,
        transport: &dyn Transport,
        signers: &[&(dyn Signer + Sync)],
    ) -> Result<Signature> {
        let instruction = self.build()?;
        transport
            .send_instruction(instruction, signers)
            .await
            .map_err(|e| self.program.map_program_error(e))
    }

    fn assemble(&self, resolved: &ResolvedAccounts) -> Result<Instruction> {
        let data = self
            .program
            .codec
            .encode_instruction(&self.def.name, &self.input.args)?;
        let mut accounts = resolved.to_account_metas(&self.program.program_id);
        accounts.extend(self.remaining.iter().cloned());
        Ok(Instruction {
            program_id: self.program.program_id,
            accounts,
            data,
        })
    }

    /// Slots whose record is read by a field seed, known by address but not yet fetched
    fn missing_records(&self, partial: &ResolvedAccounts) -> Vec<(String, Pubkey, Option<String>)> {
        let mut wanted: Vec<(String, Pubkey, Option<String>)> = Vec::new();
        for account in &self.def.accounts {
            if partial.get(&account.name).is_some() {
                continue;
            }
            let Some(Derivation::Pda { seeds, program }) = &account.derivation else {
                continue;
            };
            for seed in seeds.iter().chain(program.iter()) {
                let Seed::AccountField { slot, record, .. } = seed else {
                    continue;
                };
                if self.input.account_data.contains_key(slot)
                    || wanted.iter().any(|(s, _, _)| s == slot)
                {
                    continue;
                }
                if let Some(address) = partial.get(slot) {
                    wanted.push((slot.clone(), address, record.clone()));
                }
            }
        }
        wanted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::{find_program_address, SYSTEM_PROGRAM_ID};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    const PROGRAM: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

    const IDL: &str = r#"{
        "address": "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS",
        "metadata": {"name": "counter", "version": "0.1.0"},
        "instructions": [
            {"name": "increment", "args": [{"name": "by", "type": "u64"}], "accounts": [
                {"name": "counter", "writable": true, "pda": {"seeds": [
                    {"kind": "const", "value": [99, 111, 117, 110, 116, 101, 114]},
                    {"kind": "account", "path": "authority"}
                ]}},
                {"name": "authority", "signer": true},
                {"name": "systemProgram"}
            ]},
            {"name": "audit", "args": [], "accounts": [
                {"name": "counter"},
                {"name": "receipt", "pda": {"seeds": [
                    {"kind": "account", "path": "counter.authority", "account": "Counter"}
                ]}}
            ]}
        ],
        "accounts": [{"name": "Counter"}],
        "types": [{"name": "Counter", "type": {"kind": "struct", "fields": [
            {"name": "authority", "type": "pubkey"},
            {"name": "count", "type": "u64"}
        ]}}],
        "errors": [{"code": 6000, "name": "Overflow", "msg": "Counter overflowed"}]
    }"#;

    #[derive(Default)]
    struct MemoryTransport {
        accounts: HashMap<Pubkey, Vec<u8>>,
        sent: Mutex<Vec<Instruction>>,
        failure: Option<String>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn send_instruction(
            &self,
            instruction: Instruction,
            _signers: &[&(dyn Signer + Sync)],
        ) -> Result<Signature> {
            if let Some(message) = &self.failure {
                return Err(transport::transport_error(message));
            }
            self.sent.lock().unwrap().push(instruction);
            Ok(Signature::default())
        }

        async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
            Ok(self.accounts.get(address).cloned())
        }
    }

    fn program() -> Program {
        Program::from_idl_json(IDL).unwrap()
    }

    #[test]
    fn test_build_resolves_and_encodes() {
        let program = program();
        let authority = Pubkey::new_unique();
        let ix = program
            .instruction("increment")
            .unwrap()
            .args(Value::structure([("by", Value::U64(2))]))
            .account("authority", authority)
            .build()
            .unwrap();

        let (counter, _) =
            find_program_address(&[&b"counter"[..], authority.as_ref()], &program.id()).unwrap();
        assert_eq!(ix.program_id, Pubkey::from_str(PROGRAM).unwrap());
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(counter, false),
                AccountMeta::new_readonly(authority, true),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ]
        );
        assert_eq!(ix.data.len(), 16);
        assert_eq!(&ix.data[8..], &2u64.to_le_bytes());
    }

    #[test]
    fn test_args_json_and_remaining_accounts() {
        let program = program();
        let extra = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let ix = program
            .instruction("increment")
            .unwrap()
            .args_json(&serde_json::json!({"by": "5"}))
            .unwrap()
            .account("authority", Pubkey::new_unique())
            .remaining_accounts([extra.clone()])
            .build()
            .unwrap();
        assert_eq!(ix.accounts.last(), Some(&extra));
        assert_eq!(&ix.data[8..], &5u64.to_le_bytes());
    }

    #[test]
    fn test_missing_program_address() {
        let registry = Registry::from_json(r#"{"instructions": []}"#).unwrap();
        assert_eq!(
            Program::new(Arc::new(registry)).unwrap_err(),
            ClientError::MissingProgramAddress.into()
        );
    }

    #[tokio::test]
    async fn test_resolve_with_fetches_seed_records() {
        let program = program();
        let counter = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let record = program
            .codec()
            .encode_account(
                "Counter",
                &Value::structure([
                    ("authority", Value::Pubkey(authority)),
                    ("count", Value::U64(1)),
                ]),
            )
            .unwrap();
        let transport = MemoryTransport {
            accounts: HashMap::from([(counter, record)]),
            ..Default::default()
        };

        let mut builder = program
            .instruction("audit")
            .unwrap()
            .account("counter", counter);
        assert!(builder.build().is_err());

        let ix = builder.build_with(&transport).await.unwrap();
        let (receipt, _) = find_program_address(&[authority.as_ref()], &program.id()).unwrap();
        assert_eq!(ix.accounts[1].pubkey, receipt);

        let fetched = program
            .fetch_account("Counter", &counter, &transport)
            .await
            .unwrap();
        assert_eq!(fetched.get("count"), Some(&Value::U64(1)));
    }

    #[tokio::test]
    async fn test_send_maps_program_errors() {
        let program = program();
        let transport = MemoryTransport {
            failure: Some("Transaction simulation failed: custom program error: 0x1770".into()),
            ..Default::default()
        };
        let err = program
            .instruction("increment")
            .unwrap()
            .args(Value::structure([("by", Value::U64(1))]))
            .account("authority", Pubkey::new_unique())
            .send(&transport, &[])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Program {
                code: 6000,
                name: "Overflow".into(),
                msg: Some("Counter overflowed".into()),
            }
            .into()
        );
    }

    #[tokio::test]
    async fn test_send_submits_instruction() {
        let program = program();
        let transport = MemoryTransport::default();
        program
            .instruction("increment")
            .unwrap()
            .args(Value::structure([("by", Value::U64(1))]))
            .account("authority", Pubkey::new_unique())
            .send(&transport, &[])
            .await
            .unwrap();
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
