//! # Account Resolver
//!
//! Fills in the account slots a caller did not supply. Each pass walks the
//! unresolved slots in declaration order and resolves whichever have all of
//! their dependencies available: PDA seeds, associated-token inputs or a
//! pass-through relation. A slot resolved early in a pass is visible to the
//! slots after it in the same pass. Passes repeat until every slot is known,
//! a pass makes no progress, or `max_depth` passes have run.
//!
//! The resolver performs no I/O. Seeds that read fields of another account's
//! record need that record's decoded value in [`ResolveInput::account_data`].

use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::{ResolveError, Result};
use crate::idl::{IdlDefinedFields, IdlType, IdlTypeDefTy};
use crate::pda::{self, seed_bytes, TOKEN_PROGRAM_ID};
use crate::registry::{AccountConstraint, Derivation, InstructionDef, Registry, Relation, Seed};
use crate::value::Value;

/// Default pass limit
pub const MAX_DEPTH: usize = 16;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum number of passes
    pub max_depth: usize,
    /// Fill slots named after well-known programs (`systemProgram`, `rent`, ...)
    pub well_known_programs: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            well_known_programs: true,
        }
    }
}

impl ResolverConfig {
    /// Set the pass limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable well-known program slots
    pub fn with_well_known_programs(mut self, enabled: bool) -> Self {
        self.well_known_programs = enabled;
        self
    }
}

/// What the caller knows before resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveInput {
    /// Addresses supplied by slot name
    pub addresses: HashMap<String, Pubkey>,
    /// Instruction arguments as a struct value
    pub args: Value,
    /// Decoded record data by slot name, for record-field seeds
    pub account_data: HashMap<String, Value>,
}

impl Default for ResolveInput {
    fn default() -> Self {
        Self {
            addresses: HashMap::new(),
            args: Value::Struct(Vec::new()),
            account_data: HashMap::new(),
        }
    }
}

impl ResolveInput {
    /// Empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a slot's address
    pub fn with_address(mut self, slot: impl Into<String>, address: Pubkey) -> Self {
        self.addresses.insert(slot.into(), address);
        self
    }

    /// Supply the instruction arguments
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Supply a slot's decoded record data
    pub fn with_account_data(mut self, slot: impl Into<String>, data: Value) -> Self {
        self.account_data.insert(slot.into(), data);
        self
    }
}

/// One slot after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    /// Slot name
    pub name: String,
    /// Address; `None` for optional slots left empty and, after
    /// [`AccountsResolver::resolve_partial`], for any slot still unresolved
    pub address: Option<Pubkey>,
    /// Declared writable flag
    pub writable: bool,
    /// Declared signer flag
    pub signer: bool,
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccounts {
    /// Slots in declaration order
    pub accounts: Vec<ResolvedSlot>,
    /// Passes run
    pub passes: usize,
}

impl ResolvedAccounts {
    /// Address of a slot, if it was resolved
    pub fn get(&self, slot: &str) -> Option<Pubkey> {
        self.accounts
            .iter()
            .find(|s| s.name == slot)
            .and_then(|s| s.address)
    }

    /// `(slot, address)` pairs in declaration order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, Option<Pubkey>)> {
        self.accounts.iter().map(|s| (s.name.as_str(), s.address))
    }

    /// Account metas in declaration order
    ///
    /// Empty optional slots are filled with `program_id`, read-only and
    /// unsigned, which programs interpret as "not provided".
    pub fn to_account_metas(&self, program_id: &Pubkey) -> Vec<AccountMeta> {
        self.accounts
            .iter()
            .map(|slot| match slot.address {
                Some(address) if slot.writable => AccountMeta::new(address, slot.signer),
                Some(address) => AccountMeta::new_readonly(address, slot.signer),
                None => AccountMeta::new_readonly(*program_id, false),
            })
            .collect()
    }
}

/// Resolves instruction accounts against one schema
#[derive(Debug, Clone)]
pub struct AccountsResolver {
    registry: Arc<Registry>,
    program_id: Pubkey,
    config: ResolverConfig,
}

impl AccountsResolver {
    /// Create a resolver for the program at `program_id`
    pub fn new(registry: Arc<Registry>, program_id: Pubkey) -> Self {
        Self {
            registry,
            program_id,
            config: ResolverConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every slot of `instruction`
    pub fn resolve(&self, instruction: &str, input: &ResolveInput) -> Result<ResolvedAccounts> {
        let ix = self
            .registry
            .instruction(instruction)
            .map_err(|_| ResolveError::UnknownInstruction(instruction.to_string()))?;
        self.resolve_instruction(ix, input)
    }

    /// Resolve every slot of an already looked-up instruction
    pub fn resolve_instruction(
        &self,
        ix: &InstructionDef,
        input: &ResolveInput,
    ) -> Result<ResolvedAccounts> {
        let (known, passes) = self.run(ix, input)?;

        let missing: Vec<String> = ix
            .accounts
            .iter()
            .filter(|a| !a.optional && !known.contains_key(a.name.as_str()))
            .map(|a| a.name.clone())
            .collect();
        if !missing.is_empty() {
            tracing::debug!(instruction = %ix.name, passes, unresolved = ?missing, "Account resolution failed");
            return Err(ResolveError::Unresolved { slots: missing }.into());
        }

        tracing::debug!(instruction = %ix.name, passes, "Accounts resolved");
        Ok(collect(ix, &known, passes))
    }

    /// Resolve as much as possible without failing on missing slots
    ///
    /// Unresolved slots, required or not, are reported with no address.
    pub fn resolve_partial(&self, instruction: &str, input: &ResolveInput) -> Result<ResolvedAccounts> {
        let ix = self
            .registry
            .instruction(instruction)
            .map_err(|_| ResolveError::UnknownInstruction(instruction.to_string()))?;
        let (known, passes) = self.run(ix, input)?;
        Ok(collect(ix, &known, passes))
    }

    fn run<'i>(
        &self,
        ix: &'i InstructionDef,
        input: &ResolveInput,
    ) -> Result<(HashMap<&'i str, Pubkey>, usize)> {
        let mut known: HashMap<&str, Pubkey> = HashMap::new();
        for (slot, address) in &input.addresses {
            match ix.account(slot) {
                Some(account) => {
                    known.insert(account.name.as_str(), *address);
                }
                None => tracing::debug!(
                    instruction = %ix.name,
                    slot = %slot,
                    "Ignoring address for unknown slot"
                ),
            }
        }

        let pass = Pass {
            resolver: self,
            ix,
            input,
        };
        let mut passes = 0;
        while passes < self.config.max_depth
            && ix.accounts.iter().any(|a| !known.contains_key(a.name.as_str()))
        {
            passes += 1;
            let mut progress = false;
            for account in &ix.accounts {
                if known.contains_key(account.name.as_str()) {
                    continue;
                }
                if let Some(address) = pass.try_resolve(account, &known)? {
                    tracing::trace!(slot = %account.name, %address, pass = passes, "Resolved account");
                    known.insert(account.name.as_str(), address);
                    progress = true;
                }
            }
            tracing::trace!(instruction = %ix.name, pass = passes, resolved = known.len(), "Resolver pass");
            if !progress {
                break;
            }
        }
        Ok((known, passes))
    }
}

fn collect(ix: &InstructionDef, known: &HashMap<&str, Pubkey>, passes: usize) -> ResolvedAccounts {
    ResolvedAccounts {
        accounts: ix
            .accounts
            .iter()
            .map(|a| ResolvedSlot {
                name: a.name.clone(),
                address: known.get(a.name.as_str()).copied(),
                writable: a.writable,
                signer: a.signer,
            })
            .collect(),
        passes,
    }
}

/// Per-call state shared by every slot of a pass
struct Pass<'a> {
    resolver: &'a AccountsResolver,
    ix: &'a InstructionDef,
    input: &'a ResolveInput,
}

impl Pass<'_> {
    /// `Ok(None)` when a dependency is not available yet
    fn try_resolve(
        &self,
        account: &AccountConstraint,
        known: &HashMap<&str, Pubkey>,
    ) -> Result<Option<Pubkey>> {
        if let Some(derivation) = &account.derivation {
            return self.derive(account, derivation, known);
        }
        if let Some(relation) = &account.relation {
            return Ok(match relation {
                Relation::Slot(slot) => known.get(slot.as_str()).copied(),
                Relation::Address(address) => Some(*address),
                Relation::Program => Some(self.resolver.program_id),
            });
        }
        if self.resolver.config.well_known_programs {
            return Ok(pda::well_known_address(&account.name));
        }
        Ok(None)
    }

    fn derive(
        &self,
        account: &AccountConstraint,
        derivation: &Derivation,
        known: &HashMap<&str, Pubkey>,
    ) -> Result<Option<Pubkey>> {
        let slot = account.name.as_str();
        let derivation_failed = |source| ResolveError::Derivation {
            slot: slot.to_string(),
            source,
        };

        match derivation {
            Derivation::Pda { seeds, program } => {
                let mut bytes = Vec::with_capacity(seeds.len());
                for seed in seeds {
                    match self.seed(slot, seed, known)? {
                        Some(seed) => bytes.push(seed),
                        None => return Ok(None),
                    }
                }
                let program_id = match program {
                    None => self.resolver.program_id,
                    Some(seed) => match self.seed(slot, seed, known)? {
                        Some(raw) => {
                            let raw: [u8; 32] = raw.try_into().map_err(|raw: Vec<u8>| {
                                ResolveError::Seed {
                                    slot: slot.to_string(),
                                    reason: format!(
                                        "program seed is {} bytes, expected 32",
                                        raw.len()
                                    ),
                                }
                            })?;
                            Pubkey::new_from_array(raw)
                        }
                        None => return Ok(None),
                    },
                };
                let (address, _) =
                    pda::find_program_address(&bytes, &program_id).map_err(derivation_failed)?;
                Ok(Some(address))
            }
            Derivation::Associated {
                wallet,
                mint,
                token_program,
            } => {
                let (Some(wallet), Some(mint)) =
                    (known.get(wallet.as_str()), known.get(mint.as_str()))
                else {
                    return Ok(None);
                };
                let token_program = match token_program {
                    Some(name) => match known.get(name.as_str()) {
                        Some(key) => *key,
                        None => return Ok(None),
                    },
                    None => TOKEN_PROGRAM_ID,
                };
                let address = pda::associated_token_address(wallet, mint, &token_program)
                    .map_err(derivation_failed)?;
                Ok(Some(address))
            }
        }
    }

    /// Seed bytes, `Ok(None)` while a dependency is unavailable
    fn seed(
        &self,
        slot: &str,
        seed: &Seed,
        known: &HashMap<&str, Pubkey>,
    ) -> Result<Option<Vec<u8>>> {
        let seed_error = |reason: String| ResolveError::Seed {
            slot: slot.to_string(),
            reason,
        };

        Ok(match seed {
            Seed::Bytes(bytes) => Some(bytes.clone()),
            Seed::Number { bytes, .. } => Some(bytes.clone()),
            Seed::Constant { bytes, .. } => Some(bytes.clone()),
            Seed::Program(address) => Some(address.to_bytes().to_vec()),
            Seed::AccountKey(dep) => known.get(dep.as_str()).map(|k| k.to_bytes().to_vec()),
            Seed::AccountField {
                slot: dep,
                path,
                record: record_type,
            } => {
                // The record can only be read once its address is known
                if !known.contains_key(dep.as_str()) {
                    return Ok(None);
                }
                let Some(record) = self.input.account_data.get(dep) else {
                    return Ok(None);
                };
                let value = record.path(path).ok_or_else(|| {
                    seed_error(format!("account `{}` data has no field `{}`", dep, path))
                })?;
                let declared = record_type
                    .as_deref()
                    .and_then(|name| field_type(&self.resolver.registry, IdlType::defined(name), path));
                Some(self.typed_seed(declared.as_ref(), value).map_err(seed_error)?)
            }
            Seed::Arg { name, path } => {
                let Some(arg) = self.input.args.get(name) else {
                    return Ok(None);
                };
                let value = arg.path(path).ok_or_else(|| {
                    seed_error(format!("argument `{}` has no field `{}`", name, path))
                })?;
                let declared = self
                    .ix
                    .arg(name)
                    .and_then(|field| field_type(&self.resolver.registry, field.ty.clone(), path));
                Some(self.typed_seed(declared.as_ref(), value).map_err(seed_error)?)
            }
        })
    }

    /// Seed bytes for `value` at its declared width
    ///
    /// Fixed-size primitives go through the codec so a `U64(7)` supplied for
    /// a `u16` argument seeds with two bytes, exactly as it is encoded in the
    /// instruction data. Everything else uses the raw seed form.
    fn typed_seed(
        &self,
        declared: Option<&IdlType>,
        value: &Value,
    ) -> std::result::Result<Vec<u8>, String> {
        match declared {
            Some(ty @ IdlType::Primitive(p)) if p.fixed_size().is_some() => {
                Codec::new(Arc::clone(&self.resolver.registry))
                    .encode_type(ty, value)
                    .map_err(|e| e.to_string())
            }
            _ => seed_bytes(value),
        }
    }
}

/// Declared type found by following `path` through named struct fields
///
/// Options are looked through the same way [`Value::path`] does. `None` when
/// the path leaves the schema's named structs.
fn field_type(registry: &Registry, mut ty: IdlType, path: &str) -> Option<IdlType> {
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        ty = match ty {
            IdlType::Option { option: inner } | IdlType::COption { coption: inner } => *inner,
            other => other,
        };
        let def = registry.type_def(ty.defined_name()?).ok()?;
        let IdlTypeDefTy::Struct {
            fields: Some(IdlDefinedFields::Named(fields)),
        } = &def.ty
        else {
            return None;
        };
        ty = fields.iter().find(|f| f.name == segment)?.ty.clone();
    }
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pda::{find_program_address, SYSTEM_PROGRAM_ID};
    use std::str::FromStr;

    const PROGRAM: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

    fn resolver(instructions: &str) -> AccountsResolver {
        let idl = format!(
            r#"{{"address": "{}", "instructions": {}, "accounts": [{{"name": "Config"}}],
                "types": [{{"name": "Config", "type": {{"kind": "struct", "fields": [
                    {{"name": "admin", "type": "pubkey"}}
                ]}}}}]}}"#,
            PROGRAM, instructions
        );
        let registry = Arc::new(Registry::from_json(&idl).unwrap());
        AccountsResolver::new(registry, Pubkey::from_str(PROGRAM).unwrap())
    }

    fn program() -> Pubkey {
        Pubkey::from_str(PROGRAM).unwrap()
    }

    #[test]
    fn test_chain_resolves_out_of_order() {
        // a <- b <- c, declared so that a single forward pass cannot finish
        let resolver = resolver(
            r#"[{"name": "chain", "args": [], "accounts": [
                {"name": "a", "pda": {"seeds": [{"kind": "account", "path": "b"}]}},
                {"name": "b", "pda": {"seeds": [{"kind": "account", "path": "c"}]}},
                {"name": "c", "pda": {"seeds": [{"kind": "const", "value": [1, 2, 3]}]}}
            ]}]"#,
        );
        let resolved = resolver.resolve("chain", &ResolveInput::new()).unwrap();
        assert!(resolved.passes <= 3);

        let (c, _) = find_program_address(&[&[1u8, 2, 3][..]], &program()).unwrap();
        let (b, _) = find_program_address(&[c.as_ref()], &program()).unwrap();
        let (a, _) = find_program_address(&[b.as_ref()], &program()).unwrap();
        assert_eq!(resolved.get("c"), Some(c));
        assert_eq!(resolved.get("b"), Some(b));
        assert_eq!(resolved.get("a"), Some(a));
    }

    #[test]
    fn test_unresolved_slots_reported_in_order() {
        let resolver = resolver(
            r#"[{"name": "stuck", "args": [], "accounts": [
                {"name": "pda", "pda": {"seeds": [{"kind": "account", "path": "user"}]}},
                {"name": "user", "signer": true},
                {"name": "anotherPda", "pda": {"seeds": [{"kind": "account", "path": "pda"}]}}
            ]}]"#,
        );
        let err = resolver.resolve("stuck", &ResolveInput::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Reached maximum depth for account resolution. Unresolved accounts: `pda`, `user`, `anotherPda`"
        );

        let user = Pubkey::new_unique();
        let resolved = resolver
            .resolve("stuck", &ResolveInput::new().with_address("user", user))
            .unwrap();
        assert!(resolved.get("anotherPda").is_some());
    }

    #[test]
    fn test_depth_limit() {
        let resolver = resolver(
            r#"[{"name": "chain", "args": [], "accounts": [
                {"name": "a", "pda": {"seeds": [{"kind": "account", "path": "b"}]}},
                {"name": "b", "pda": {"seeds": [{"kind": "account", "path": "c"}]}},
                {"name": "c", "pda": {"seeds": [{"kind": "const", "value": [1]}]}}
            ]}]"#,
        )
        .with_config(ResolverConfig::default().with_max_depth(1));
        match resolver.resolve("chain", &ResolveInput::new()).unwrap_err() {
            Error::Resolve(ResolveError::Unresolved { slots }) => {
                assert_eq!(slots, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_arg_and_record_field_seeds() {
        let resolver = resolver(
            r#"[{"name": "vote", "args": [{"name": "round", "type": "u16"}], "accounts": [
                {"name": "config"},
                {"name": "ballot", "pda": {"seeds": [
                    {"kind": "const", "value": [98]},
                    {"kind": "account", "path": "config.admin", "account": "Config"},
                    {"kind": "arg", "path": "round"}
                ]}}
            ]}]"#,
        );
        let config = Pubkey::new_unique();
        let admin = Pubkey::new_unique();
        let input = ResolveInput::new()
            .with_address("config", config)
            .with_args(Value::structure([("round", Value::U16(7))]));

        // Without the record data the field seed cannot be built
        assert!(resolver.resolve("vote", &input).is_err());

        let input = input.with_account_data(
            "config",
            Value::structure([("admin", Value::Pubkey(admin))]),
        );
        let resolved = resolver.resolve("vote", &input).unwrap();
        let (expected, _) =
            find_program_address(&[&[98u8][..], admin.as_ref(), &7u16.to_le_bytes()], &program())
                .unwrap();
        assert_eq!(resolved.get("ballot"), Some(expected));
    }

    #[test]
    fn test_arg_seed_uses_declared_width() {
        let resolver = resolver(
            r#"[{"name": "vote", "args": [{"name": "round", "type": "u16"}], "accounts": [
                {"name": "ballot", "pda": {"seeds": [{"kind": "arg", "path": "round"}]}}
            ]}]"#,
        );
        let wide = ResolveInput::new().with_args(Value::structure([("round", Value::U64(7))]));
        let narrow = ResolveInput::new().with_args(Value::structure([("round", Value::U16(7))]));

        let ballot = resolver.resolve("vote", &wide).unwrap().get("ballot");
        assert_eq!(ballot, resolver.resolve("vote", &narrow).unwrap().get("ballot"));
        assert_eq!(
            ballot,
            Some(Pubkey::from_str("G8CuHBZTAsEkKbs2P96riaGNLE6kgPjFodZESuyMUAah").unwrap())
        );

        // Out of range for the declared width
        let overflow = ResolveInput::new().with_args(Value::structure([("round", Value::U64(70_000))]));
        assert!(matches!(
            resolver.resolve("vote", &overflow).unwrap_err(),
            Error::Resolve(ResolveError::Seed { .. })
        ));
    }

    #[test]
    fn test_nested_field_seeds_use_declared_width() {
        let idl = format!(
            r#"{{"address": "{}", "accounts": [{{"name": "Pool"}}],
                "instructions": [{{"name": "swap",
                    "args": [{{"name": "params", "type": {{"defined": "Params"}}}}],
                    "accounts": [
                        {{"name": "pool"}},
                        {{"name": "ticket", "pda": {{"seeds": [
                            {{"kind": "arg", "path": "params.tier"}},
                            {{"kind": "account", "path": "pool.epoch", "account": "Pool"}}
                        ]}}}}
                    ]}}],
                "types": [
                    {{"name": "Params", "type": {{"kind": "struct", "fields": [
                        {{"name": "tier", "type": "u8"}}
                    ]}}}},
                    {{"name": "Pool", "type": {{"kind": "struct", "fields": [
                        {{"name": "epoch", "type": "u32"}}
                    ]}}}}
                ]}}"#,
            PROGRAM
        );
        let resolver = AccountsResolver::new(Arc::new(Registry::from_json(&idl).unwrap()), program());
        let input = ResolveInput::new()
            .with_address("pool", Pubkey::new_unique())
            .with_args(Value::structure([(
                "params",
                Value::structure([("tier", Value::I64(3))]),
            )]))
            .with_account_data("pool", Value::structure([("epoch", Value::U64(9))]));

        let (expected, _) =
            find_program_address(&[&[3u8][..], &9u32.to_le_bytes()], &program()).unwrap();
        assert_eq!(resolver.resolve("swap", &input).unwrap().get("ticket"), Some(expected));
    }

    #[test]
    fn test_unserializable_arg_seed_is_hard_error() {
        let resolver = resolver(
            r#"[{"name": "bad", "args": [{"name": "flag", "type": {"option": "u8"}}], "accounts": [
                {"name": "p", "pda": {"seeds": [{"kind": "arg", "path": "flag"}]}}
            ]}]"#,
        );
        let input = ResolveInput::new().with_args(Value::structure([("flag", Value::none())]));
        assert!(matches!(
            resolver.resolve("bad", &input).unwrap_err(),
            Error::Resolve(ResolveError::Seed { .. })
        ));
    }

    #[test]
    fn test_relations_well_known_and_optional() {
        let resolver = resolver(
            r#"[{"name": "misc", "args": [], "accounts": [
                {"name": "authority", "signer": true, "writable": true},
                {"name": "payer", "relation": {"kind": "account", "path": "authority"}},
                {"name": "self", "relation": {"kind": "program"}},
                {"name": "systemProgram"},
                {"name": "extra", "optional": true}
            ]}]"#,
        );
        let authority = Pubkey::new_unique();
        let resolved = resolver
            .resolve("misc", &ResolveInput::new().with_address("authority", authority))
            .unwrap();
        assert_eq!(resolved.get("payer"), Some(authority));
        assert_eq!(resolved.get("self"), Some(program()));
        assert_eq!(resolved.get("systemProgram"), Some(SYSTEM_PROGRAM_ID));
        assert_eq!(resolved.get("extra"), None);

        let metas = resolved.to_account_metas(&program());
        assert_eq!(metas.len(), 5);
        assert!(metas[0].is_signer && metas[0].is_writable);
        assert_eq!(metas[4].pubkey, program());
        assert!(!metas[4].is_writable);
    }

    #[test]
    fn test_associated_token_slot() {
        let resolver = resolver(
            r#"[{"name": "deposit", "args": [], "accounts": [
                {"name": "vault", "associated": {"wallet": "owner", "mint": "mint"}},
                {"name": "owner"},
                {"name": "mint"}
            ]}]"#,
        );
        let owner = Pubkey::new_from_array([7; 32]);
        let mint = Pubkey::new_from_array([9; 32]);
        let resolved = resolver
            .resolve(
                "deposit",
                &ResolveInput::new()
                    .with_address("owner", owner)
                    .with_address("mint", mint),
            )
            .unwrap();
        assert_eq!(
            resolved.get("vault"),
            Some(Pubkey::from_str("CnU79ysioMMySsPdq8kVXbQRRP9pevXY1dBubWx6YStG").unwrap())
        );
    }

    #[test]
    fn test_partial_resolution_reports_gaps() {
        let resolver = resolver(
            r#"[{"name": "half", "args": [], "accounts": [
                {"name": "fixed", "pda": {"seeds": [{"kind": "const", "value": [1]}]}},
                {"name": "user"}
            ]}]"#,
        );
        let partial = resolver.resolve_partial("half", &ResolveInput::new()).unwrap();
        assert!(partial.get("fixed").is_some());
        assert_eq!(partial.get("user"), None);
        assert_eq!(partial.pairs().count(), 2);
    }

    #[test]
    fn test_unknown_instruction() {
        let resolver = resolver("[]");
        assert_eq!(
            resolver.resolve("nope", &ResolveInput::new()).unwrap_err(),
            Error::Resolve(ResolveError::UnknownInstruction("nope".to_string()))
        );
    }
}
