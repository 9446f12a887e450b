//! # Address Derivation
//!
//! Program-derived addresses: `sha256(seeds || bump || program || "ProgramDerivedAddress")`
//! with the bump searched from 255 down to 0 until the hash is not a valid
//! compressed Ed25519 point. Such an address has no private key, so only the
//! owning program can sign for it.

pub mod programs;
pub mod seeds;

pub use programs::{
    well_known_address, ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use seeds::seed_bytes;

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::error::DerivationError;

/// Maximum number of seeds, bump included
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes
pub const MAX_SEED_LEN: usize = 32;

/// Domain separator appended after the program address
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Whether 32 bytes decode as a point on the Ed25519 curve
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

fn check_seeds<S: AsRef<[u8]>>(seeds: &[S], max: usize) -> Result<(), DerivationError> {
    if seeds.len() > max {
        return Err(DerivationError::TooManySeeds {
            count: seeds.len(),
            max,
        });
    }
    for (index, seed) in seeds.iter().enumerate() {
        let len = seed.as_ref().len();
        if len > MAX_SEED_LEN {
            return Err(DerivationError::MaxSeedLength {
                index,
                len,
                max: MAX_SEED_LEN,
            });
        }
    }
    Ok(())
}

fn hash_candidate<S: AsRef<[u8]>>(seeds: &[S], bump: Option<u8>, program: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed.as_ref());
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program.as_ref());
    hasher.update(PDA_MARKER);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Derive an address from seeds that already include the bump
///
/// Fails with [`DerivationError::OnCurve`] when the candidate is a valid curve point.
pub fn create_program_address<S: AsRef<[u8]>>(
    seeds: &[S],
    program: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    check_seeds(seeds, MAX_SEEDS)?;
    let hash = hash_candidate(seeds, None, program);
    if is_on_curve(&hash) {
        return Err(DerivationError::OnCurve);
    }
    Ok(Pubkey::new_from_array(hash))
}

/// Find the canonical program address and its bump
///
/// Bumps are tried from 255 down; the first off-curve candidate wins.
pub fn find_program_address<S: AsRef<[u8]>>(
    seeds: &[S],
    program: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    check_seeds(seeds, MAX_SEEDS - 1)?;
    for bump in (0..=u8::MAX).rev() {
        let hash = hash_candidate(seeds, Some(bump), program);
        if !is_on_curve(&hash) {
            tracing::trace!(program = %program, bump, "Derived program address");
            return Ok((Pubkey::new_from_array(hash), bump));
        }
    }
    Err(DerivationError::NoValidBump)
}

/// Associated token account of `wallet` for `mint` under `token_program`
pub fn associated_token_address(
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    let seeds: [&[u8]; 3] = [wallet.as_ref(), token_program.as_ref(), mint.as_ref()];
    find_program_address(&seeds, &ASSOCIATED_TOKEN_PROGRAM_ID).map(|(address, _)| address)
}
