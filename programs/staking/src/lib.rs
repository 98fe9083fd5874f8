#![deny(missing_docs)]
#![cfg_attr(not(test), forbid(unsafe_code))]

//! Staking program: stake SOL, accrue points over time, claim points as SPL tokens

pub mod error;
pub mod instruction;
pub mod points;
pub mod processor;
pub mod state;

// Exclude the on-chain entrypoint when building unit tests or when the
// consumer opts into the "no-entrypoint" feature (host-side contexts).
#[cfg(all(not(feature = "no-entrypoint"), not(test)))]
mod entrypoint;

use solana_program::pubkey::Pubkey;

solana_program::declare_id!("FhqzRxobtLDbbdaJXFfx6Tei2iosd9T2UeXvo96FTZbN");

/// PDA seed for a user's stake account
pub const STAKE_ACCOUNT_SEED: &[u8] = b"stake_account";

/// PDA seed for the reward mint authority
pub const MINT_AUTHORITY_SEED: &[u8] = b"mint_authority";

/// Helper to derive the `StakeAccount` PDA for a given owner
pub fn find_stake_account_pda_with_program(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STAKE_ACCOUNT_SEED, owner.as_ref()], program_id)
}

/// Helper to derive the reward mint authority PDA
pub fn find_mint_authority_pda_with_program(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINT_AUTHORITY_SEED], program_id)
}
