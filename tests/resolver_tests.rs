//! Integration tests for account resolution against the fixture schema

use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use solidl::pda::{
    associated_token_address, find_program_address, ASSOCIATED_TOKEN_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use solidl::{
    AccountsResolver, Error, ErrorSeverity, Registry, ResolveError, ResolveInput, ResolverConfig,
    Value,
};
use std::sync::Arc;

fn resolver() -> AccountsResolver {
    let path = format!("{}/tests/fixtures/counter.json", env!("CARGO_MANIFEST_DIR"));
    let registry = Registry::from_json(&std::fs::read_to_string(path).unwrap()).unwrap();
    let program_id = registry.program_id().unwrap();
    AccountsResolver::new(Arc::new(registry), program_id)
}

#[test]
fn test_deposit_resolves_pda_and_token_accounts() {
    let resolver = resolver();
    let program = resolver_program();
    let authority = Pubkey::new_from_array([7; 32]);
    let mint = Pubkey::new_from_array([9; 32]);

    let resolved = resolver
        .resolve(
            "deposit",
            &ResolveInput::new()
                .with_address("authority", authority)
                .with_address("mint", mint),
        )
        .unwrap();

    let (vault, _) = find_program_address(&[&b"vault"[..], authority.as_ref()], &program).unwrap();
    assert_eq!(resolved.get("vault"), Some(vault));
    assert_eq!(
        resolved.get("vault"),
        Some(key("BqUYkpJPeiCga7wXqxDQNrjhuVrgGg1pf8KJkLRFadHJ"))
    );
    assert_eq!(
        resolved.get("userToken"),
        Some(key("CnU79ysioMMySsPdq8kVXbQRRP9pevXY1dBubWx6YStG"))
    );
    // vaultToken waits on vault, which is only known after its own derivation
    assert_eq!(
        resolved.get("vaultToken"),
        Some(key("31o9Wi5naot6WdHgWAnhxxPuAHhJtgaVt352fk5T81ib"))
    );
    assert_eq!(
        resolved.get("vaultToken"),
        Some(associated_token_address(&vault, &mint, &TOKEN_PROGRAM_ID).unwrap())
    );
    assert_eq!(resolved.get("tokenProgram"), Some(TOKEN_PROGRAM_ID));
    assert_eq!(
        resolved.get("associatedTokenProgram"),
        Some(ASSOCIATED_TOKEN_PROGRAM_ID)
    );
    assert_eq!(resolved.get("systemProgram"), Some(SYSTEM_PROGRAM_ID));
}

#[test]
fn test_caller_addresses_take_precedence() {
    let resolver = resolver();
    let authority = Pubkey::new_unique();
    let custom_vault = Pubkey::new_unique();
    let resolved = resolver
        .resolve(
            "deposit",
            &ResolveInput::new()
                .with_address("authority", authority)
                .with_address("mint", Pubkey::new_unique())
                .with_address("vault", custom_vault),
        )
        .unwrap();
    assert_eq!(resolved.get("vault"), Some(custom_vault));
}

#[test]
fn test_configure_relations_args_and_optional_slot() {
    let resolver = resolver();
    let program = resolver_program();
    let payer = Pubkey::new_unique();
    let settings = Value::structure([
        ("mode", Value::U8(4)),
        (
            "limits",
            Value::Array(vec![Value::U16(0), Value::U16(0), Value::U16(0)]),
        ),
        ("fee", Value::none()),
        ("delegate", Value::none()),
        ("tags", Value::Vec(vec![])),
        ("schedule", Value::unit_variant("Off")),
    ]);

    let resolved = resolver
        .resolve(
            "configure",
            &ResolveInput::new()
                .with_address("payer", payer)
                .with_args(Value::structure([("settings", settings)])),
        )
        .unwrap();

    let (expected, _) = find_program_address(&[&b"settings"[..], &[4u8]], &program).unwrap();
    assert_eq!(resolved.get("settings"), Some(expected));
    assert_eq!(resolved.get("admin"), Some(payer));
    assert_eq!(resolved.get("program"), Some(program));
    assert_eq!(resolved.get("delegate"), None);

    let metas = resolved.to_account_metas(&program);
    assert_eq!(
        metas,
        vec![
            AccountMeta::new(expected, false),
            AccountMeta::new_readonly(payer, true),
            AccountMeta::new(payer, true),
            AccountMeta::new_readonly(program, false),
            AccountMeta::new_readonly(program, false),
        ]
    );
}

#[test]
fn test_missing_args_reported_in_declaration_order() {
    let registry = Registry::from_json(
        r#"{"address": "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS", "instructions": [
            {"name": "twoPdas", "args": [{"name": "seed", "type": "u64"}], "accounts": [
                {"name": "pda", "pda": {"seeds": [{"kind": "arg", "path": "seed"}]}},
                {"name": "payer", "signer": true, "relation": {"kind": "program"}},
                {"name": "anotherPda", "pda": {"seeds": [{"kind": "arg", "path": "seed"}]}}
            ]}
        ]}"#,
    )
    .unwrap();
    let program = registry.program_id().unwrap();
    let resolver = AccountsResolver::new(Arc::new(registry), program);

    let err = resolver.resolve("twoPdas", &ResolveInput::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Reached maximum depth for account resolution. Unresolved accounts: `pda`, `anotherPda`"
    );
    assert_eq!(err.classify(), ErrorSeverity::Recoverable);

    // Supplying the argument and retrying succeeds
    let resolved = resolver
        .resolve(
            "twoPdas",
            &ResolveInput::new().with_args(Value::structure([("seed", Value::U64(9))])),
        )
        .unwrap();
    assert_eq!(resolved.get("pda"), resolved.get("anotherPda"));
}

#[test]
fn test_disabling_well_known_programs() {
    let resolver = resolver().with_config(ResolverConfig::default().with_well_known_programs(false));
    let err = resolver
        .resolve(
            "initialize",
            &ResolveInput::new().with_address("authority", Pubkey::new_unique()),
        )
        .unwrap_err();
    match err {
        Error::Resolve(ResolveError::Unresolved { slots }) => {
            assert_eq!(slots, vec!["systemProgram".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_partial_resolution() {
    let resolver = resolver();
    let partial = resolver
        .resolve_partial("deposit", &ResolveInput::new())
        .unwrap();
    let missing: Vec<&str> = partial
        .pairs()
        .filter(|(_, address)| address.is_none())
        .map(|(slot, _)| slot)
        .collect();
    assert_eq!(missing, vec!["authority", "vault", "mint", "userToken", "vaultToken"]);
}

#[test]
fn test_unknown_instruction() {
    assert_eq!(
        resolver()
            .resolve("withdraw", &ResolveInput::new())
            .unwrap_err(),
        ResolveError::UnknownInstruction("withdraw".into()).into()
    );
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let resolver = Arc::new(resolver());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = resolver.clone();
            std::thread::spawn(move || {
                let authority = Pubkey::new_unique();
                let resolved = resolver
                    .resolve(
                        "initialize",
                        &ResolveInput::new().with_address("authority", authority),
                    )
                    .unwrap();
                (authority, resolved.get("counter").unwrap())
            })
        })
        .collect();
    for handle in handles {
        let (authority, counter) = handle.join().unwrap();
        let (expected, _) =
            find_program_address(&[&b"counter"[..], authority.as_ref()], &resolver_program())
                .unwrap();
        assert_eq!(counter, expected);
    }
}

fn resolver_program() -> Pubkey {
    "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS".parse().unwrap()
}

fn key(text: &str) -> Pubkey {
    text.parse().unwrap()
}
