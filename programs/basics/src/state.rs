//! State transition types

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        program_error::ProgramError,
        program_pack::{IsInitialized, Pack, Sealed},
    },
};

/// Account created by `Initialize`, holding the value it was initialized with
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewAccount {
    /// Set once the account has been written by the program
    pub is_initialized: bool,
    /// The stored value
    pub data: u64,
}

impl Sealed for NewAccount {}
impl IsInitialized for NewAccount {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for NewAccount {
    const LEN: usize = 1 + 8;

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
