//! End-to-end tests for the client facade with an in-memory transport

use async_trait::async_trait;
use base64::Engine;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solidl::pda::{find_program_address, SYSTEM_PROGRAM_ID};
use solidl::{ClientError, Program, ProgramOptions, ResolverConfig, Result, Transport, Value};
use std::collections::HashMap;
use std::sync::Mutex;

fn program() -> Program {
    let path = format!("{}/tests/fixtures/counter.json", env!("CARGO_MANIFEST_DIR"));
    Program::from_idl_json(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Ledger stand-in: stores account data and records submitted instructions
#[derive(Default)]
struct Ledger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    submitted: Mutex<Vec<Instruction>>,
}

#[async_trait]
impl Transport for Ledger {
    async fn send_instruction(
        &self,
        instruction: Instruction,
        signers: &[&(dyn Signer + Sync)],
    ) -> Result<Signature> {
        for meta in instruction.accounts.iter().filter(|m| m.is_signer) {
            if !signers.iter().any(|s| s.pubkey() == meta.pubkey) {
                return Err(ClientError::Transport {
                    message: format!("missing signature for {}", meta.pubkey),
                }
                .into());
            }
        }
        self.submitted.lock().unwrap().push(instruction);
        Ok(Signature::default())
    }

    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }
}

#[test]
fn test_initialize_instruction_layout() {
    let program = program();
    let authority = Pubkey::new_unique();
    let ix = program
        .instruction("initialize")
        .unwrap()
        .account("authority", authority)
        .build()
        .unwrap();

    let (counter, _) =
        find_program_address(&[&b"counter"[..], authority.as_ref()], &program.id()).unwrap();
    assert_eq!(ix.data, vec![175, 175, 109, 31, 13, 152, 155, 237]);
    assert_eq!(
        ix.accounts,
        vec![
            AccountMeta::new(counter, false),
            AccountMeta::new(authority, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ]
    );
}

#[test]
fn test_options_reach_the_resolver() {
    let program = program()
        .with_options(ProgramOptions::default().with_resolver(ResolverConfig::default().with_max_depth(0)));
    let err = program
        .instruction("initialize")
        .unwrap()
        .account("authority", Pubkey::new_unique())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("`counter`, `systemProgram`"));
}

#[test]
fn test_unknown_instruction() {
    assert!(program().instruction("withdraw").is_err());
}

#[tokio::test]
async fn test_send_checks_signers() {
    let program = program();
    let ledger = Ledger::default();
    let authority = solana_sdk::signature::Keypair::new();

    let unsigned = program
        .instruction("increment")
        .unwrap()
        .args_json(&serde_json::json!({"by": 1}))
        .unwrap()
        .account("authority", authority.pubkey())
        .send(&ledger, &[])
        .await;
    assert!(matches!(
        unsigned,
        Err(solidl::Error::Client(ClientError::Transport { .. }))
    ));

    program
        .instruction("increment")
        .unwrap()
        .args_json(&serde_json::json!({"by": 1}))
        .unwrap()
        .account("authority", authority.pubkey())
        .send(&ledger, &[&authority])
        .await
        .unwrap();
    assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_account_round_trip() {
    let program = program();
    let ledger = Ledger::default();
    let address = Pubkey::new_unique();
    let counter = Value::structure([
        ("authority", Value::Pubkey(Pubkey::new_unique())),
        ("count", Value::U64(12)),
        ("bump", Value::U8(250)),
    ]);
    let mut data = program.codec().encode_account("Counter", &counter).unwrap();
    data.resize(data.len() + 16, 0);
    ledger.accounts.lock().unwrap().insert(address, data);

    let fetched = program
        .fetch_account("Counter", &address, &ledger)
        .await
        .unwrap();
    assert_eq!(fetched, counter);

    let missing = program
        .fetch_account("Counter", &Pubkey::new_unique(), &ledger)
        .await;
    assert!(missing.is_err());
}

#[test]
fn test_event_parser_from_program() {
    let program = program();
    let depositor = Pubkey::new_unique();
    let event = Value::structure([
        ("depositor", Value::Pubkey(depositor)),
        ("amount", Value::U64(500)),
    ]);
    let payload = program.codec().encode_event("Deposited", &event).unwrap();
    let engine = base64::engine::general_purpose::STANDARD;
    let logs = vec![
        format!("Program {} invoke [1]", program.id()),
        "Program log: Instruction: Deposit".to_string(),
        format!("Program data: {}", engine.encode(&payload)),
        format!("Program {} consumed 4120 of 200000 compute units", program.id()),
        format!("Program {} success", program.id()),
    ];

    let events = program.event_parser().parse_events(&logs);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Deposited");
    assert_eq!(events[0].data, event);
}

#[test]
fn test_program_error_mapping() {
    let program = program();
    let mapped = program.map_program_error(
        ClientError::Transport {
            message: "custom program error: 0x1771".into(),
        }
        .into(),
    );
    assert_eq!(
        mapped.to_string(),
        "Program error 6001: Unauthorized"
    );

    let unknown = program.map_program_error(
        ClientError::Transport {
            message: "custom program error: 0x2a".into(),
        }
        .into(),
    );
    assert_eq!(unknown.to_string(), "Program error 42: Custom(42)");

    let untouched = program.map_program_error(
        ClientError::Transport {
            message: "blockhash not found".into(),
        }
        .into(),
    );
    assert_eq!(untouched.to_string(), "Transport error: blockhash not found");
}
