//! State transition types

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        program_error::ProgramError,
        program_pack::{IsInitialized, Pack, Sealed},
        pubkey::Pubkey,
    },
};

/// Per-user stake record, stored at the `["stake_account", owner]` PDA.
///
/// The PDA also holds the staked lamports on top of its rent-exempt reserve.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StakeAccount {
    /// Set once the account has been written by the program
    pub is_initialized: bool,
    /// The wallet allowed to stake, unstake and claim
    pub owner: Pubkey,
    /// Lamports currently staked
    pub staked_amount: u64,
    /// Accrued micro-points not yet claimed
    pub total_points: u64,
    /// Unix timestamp of the last points accrual
    pub last_update_time: i64,
    /// Canonical bump of the PDA
    pub bump: u8,
}

impl Sealed for StakeAccount {}
impl IsInitialized for StakeAccount {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for StakeAccount {
    const LEN: usize = 1 + 32 + 8 + 8 + 8 + 1;

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
