//! State transition types

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        program_error::ProgramError,
        program_pack::{IsInitialized, Pack, Sealed},
        pubkey::Pubkey,
    },
};

/// Pool record, stored at the `["amm", mint_a, mint_b]` PDA.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pool {
    /// Set once the pool has been created
    pub is_initialized: bool,
    /// Mint of side A
    pub token_a_mint: Pubkey,
    /// Mint of side B
    pub token_b_mint: Pubkey,
    /// LP mint, owned by the pool authority
    pub lp_mint: Pubkey,
    /// Token account holding side A
    pub reserve_a: Pubkey,
    /// Token account holding side B
    pub reserve_b: Pubkey,
    /// PDA that owns both reserves and mints LP tokens
    pub pool_authority: Pubkey,
    /// Bump of `pool_authority`
    pub authority_bump: u8,
    /// LP tokens in circulation
    pub lp_supply: u64,
}

impl Sealed for Pool {}
impl IsInitialized for Pool {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Pool {
    const LEN: usize = 1 + 32 * 6 + 1 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        borsh::from_slice(src).map_err(|_| ProgramError::InvalidAccountData)
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = &mut dst[..Self::LEN];
        // Pack::pack has checked the length and every field is fixed width;
        // on failure leave the record zeroed, i.e. uninitialized
        if borsh::to_writer(&mut *dst, self).is_err() {
            dst.fill(0);
        }
    }
}
