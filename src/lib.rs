//! # Solidl - Schema-Driven IDL Codec for Solana Programs
//!
//! [![Crates.io](https://img.shields.io/crates/v/solidl.svg)](https://crates.io/crates/solidl)
//! [![Documentation](https://docs.rs/solidl/badge.svg)](https://docs.rs/solidl)
//! [![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](https://opensource.org/licenses/MIT)
//!
//! Solidl reads an Anchor-style IDL document and gives you everything needed
//! to talk to the program it describes without generated code:
//!
//! - **Binary codec** - byte-exact encoding and decoding of instruction
//!   arguments, account records and events, honoring per-type length-prefix
//!   and enum-tag widths
//! - **Address derivation** - program-derived and associated token addresses
//! - **Account resolver** - fills in instruction accounts from declared seeds,
//!   relations and well-known programs in bounded multi-pass resolution
//! - **Client facade** - builds [`Instruction`](solana_sdk::instruction::Instruction)s
//!   and submits them through a pluggable [`Transport`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! solidl = "0.1"
//! ```
//!
//! ### Encoding and decoding records
//!
//! ```rust
//! use solidl::{Codec, Registry, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> solidl::Result<()> {
//! let idl = r#"{
//!     "instructions": [],
//!     "accounts": [{"name": "Counter"}],
//!     "types": [{"name": "Counter", "type": {"kind": "struct", "fields": [
//!         {"name": "count", "type": "u64"}
//!     ]}}]
//! }"#;
//!
//! let codec = Codec::new(Arc::new(Registry::from_json(idl)?));
//! let value = Value::structure([("count", Value::U64(42))]);
//!
//! let bytes = codec.encode_account("Counter", &value)?;
//! assert_eq!(&bytes[..8], &[255, 176, 4, 245, 188, 253, 124, 25]);
//!
//! let (decoded, _) = codec.decode_account("Counter", &bytes)?;
//! assert_eq!(decoded, value);
//! # Ok(())
//! # }
//! ```
//!
//! ### Building an instruction
//!
//! ```rust
//! use solidl::{Program, Value};
//! use solana_sdk::pubkey::Pubkey;
//!
//! # fn main() -> solidl::Result<()> {
//! let idl = r#"{
//!     "address": "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS",
//!     "instructions": [{"name": "initialize", "args": [], "accounts": [
//!         {"name": "counter", "writable": true,
//!          "pda": {"seeds": [{"kind": "const", "value": [99, 111, 117, 110, 116, 101, 114]}]}},
//!         {"name": "payer", "writable": true, "signer": true},
//!         {"name": "systemProgram"}
//!     ]}]
//! }"#;
//!
//! let program = Program::from_idl_json(idl)?;
//! let ix = program
//!     .instruction("initialize")?
//!     .account("payer", Pubkey::new_unique())
//!     .build()?;
//!
//! assert_eq!(ix.accounts.len(), 3);
//! assert_eq!(ix.data, vec![175, 175, 109, 31, 13, 152, 155, 237]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! IDL JSON -> idl (serde model) -> registry (validated index)
//!                                      |
//!              +-----------------------+--------------------+
//!              |                       |                    |
//!            codec                 resolver <- pda        client
//!     (encode / decode)      (multi-pass accounts)   (builder, transport,
//!                                                      event parser)
//! ```
//!
//! The registry and codec are immutable once built and can be shared across
//! threads behind an `Arc`. Resolution is synchronous and does no I/O;
//! [`InstructionBuilder::build_with`] fetches account records through a
//! [`Transport`] when seeds need them.
//!
//! ## Error Handling
//!
//! All operations return [`Result`]. Errors are grouped by stage
//! ([`SchemaError`], [`EncodeError`], [`DecodeError`], [`DerivationError`],
//! [`ResolveError`], [`ClientError`]) and carry the type name, byte offset or
//! slot names needed to diagnose them.
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

#![allow(clippy::collapsible_match)] // Separate error handling for clarity

/// Version of the solidl crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod client;
pub mod codec;
pub mod error;
pub mod idl;
pub mod pda;
pub mod registry;
pub mod resolver;
pub mod value;

// Re-export main types
pub use client::{
    parse_custom_error, EventParser, InstructionBuilder, ParsedLogs, Program, ProgramOptions,
    Transport,
};
#[cfg(feature = "rpc")]
pub use client::RpcTransport;
pub use codec::{Codec, DecodedEvent, DecodedInstruction, ParallelConfig};
pub use error::{
    ClientError, DecodeError, DerivationError, EncodeError, Error, ErrorSeverity, ResolveError,
    Result, SchemaError,
};
pub use idl::{Idl, IdlType};
pub use pda::{associated_token_address, create_program_address, find_program_address};
pub use registry::Registry;
pub use resolver::{
    AccountsResolver, ResolveInput, ResolvedAccounts, ResolvedSlot, ResolverConfig, MAX_DEPTH,
};
pub use value::{EnumFields, Value};
