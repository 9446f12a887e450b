//! Well-known program addresses

use solana_sdk::pubkey::Pubkey;

/// System program
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");

/// SPL Token program
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFM2Q2ebnVVZxsHp3Rp6");

/// Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Rent sysvar
pub const RENT_SYSVAR_ID: Pubkey =
    Pubkey::from_str_const("SysvarRent111111111111111111111111111111111");

/// Address a slot name conventionally refers to, if any
///
/// Both `camelCase` and `snake_case` spellings are recognised.
pub fn well_known_address(slot: &str) -> Option<Pubkey> {
    match slot {
        "systemProgram" | "system_program" => Some(SYSTEM_PROGRAM_ID),
        "tokenProgram" | "token_program" => Some(TOKEN_PROGRAM_ID),
        "associatedTokenProgram" | "associated_token_program" => Some(ASSOCIATED_TOKEN_PROGRAM_ID),
        "rent" => Some(RENT_SYSVAR_ID),
        _ => None,
    }
}
