//! Instruction types

use {
    crate::error::BasicsError,
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        program_error::ProgramError,
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions supported by the Basics program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum BasicsInstruction {
    /// Create `new_account` and store `data` in it
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` The account to create
    /// 1. `[writable, signer]` The payer and authority
    /// 2. `[]` The system program
    Initialize {
        /// Value written into the new account
        data: u64,
    },
}

impl BasicsInstruction {
    /// Unpack a byte array into a BasicsInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        borsh::from_slice(input).map_err(|_| BasicsError::InvalidInstructionData.into())
    }

    /// Pack the BasicsInstruction into a byte array
    pub fn pack(&self) -> Vec<u8> {
        // Serializing a fixed-layout enum into a Vec cannot fail
        borsh::to_vec(self).unwrap_or_default()
    }
}

/// Creates an `Initialize` instruction.
pub fn initialize(
    program_id: &Pubkey,
    new_account: &Pubkey,
    signer: &Pubkey,
    data: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*new_account, true),
            AccountMeta::new(*signer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: BasicsInstruction::Initialize { data }.pack(),
    }
}
