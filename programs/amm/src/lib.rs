#![deny(missing_docs)]
#![cfg_attr(not(test), forbid(unsafe_code))]

//! Constant-product AMM: a pool over two SPL token mints with an LP mint

pub mod error;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod state;

// Exclude the on-chain entrypoint when building unit tests or when the
// consumer opts into the "no-entrypoint" feature (host-side contexts).
#[cfg(all(not(feature = "no-entrypoint"), not(test)))]
mod entrypoint;

use solana_program::pubkey::Pubkey;

solana_program::declare_id!("5GwvY98CgoPByjWEz2ZL6yK2J7oZvKNySrMSSR3E4RU4");

/// PDA seed for the pool state account
pub const POOL_SEED: &[u8] = b"amm";

/// PDA seed for the token A reserve
pub const RESERVE_A_SEED: &[u8] = b"reserve_a";

/// PDA seed for the token B reserve
pub const RESERVE_B_SEED: &[u8] = b"reserve_b";

/// PDA seed for the authority over both reserves and the LP mint
pub const AUTHORITY_SEED: &[u8] = b"authority";

/// PDA seed for the LP mint
pub const LP_MINT_SEED: &[u8] = b"lp_mint";

/// Decimals of the LP mint
pub const LP_DECIMALS: u8 = 6;

fn find_pool_scoped_pda(
    seed: &[u8],
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seed, token_a_mint.as_ref(), token_b_mint.as_ref()],
        program_id,
    )
}

/// Helper to derive the pool state PDA for a mint pair
pub fn find_pool_pda_with_program(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    find_pool_scoped_pda(POOL_SEED, program_id, token_a_mint, token_b_mint)
}

/// Helper to derive the token A reserve PDA for a mint pair
pub fn find_reserve_a_pda_with_program(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    find_pool_scoped_pda(RESERVE_A_SEED, program_id, token_a_mint, token_b_mint)
}

/// Helper to derive the token B reserve PDA for a mint pair
pub fn find_reserve_b_pda_with_program(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    find_pool_scoped_pda(RESERVE_B_SEED, program_id, token_a_mint, token_b_mint)
}

/// Helper to derive the pool authority PDA for a mint pair
pub fn find_pool_authority_pda_with_program(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    find_pool_scoped_pda(AUTHORITY_SEED, program_id, token_a_mint, token_b_mint)
}

/// Helper to derive the LP mint PDA for a mint pair
pub fn find_lp_mint_pda_with_program(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
) -> (Pubkey, u8) {
    find_pool_scoped_pda(LP_MINT_SEED, program_id, token_a_mint, token_b_mint)
}
