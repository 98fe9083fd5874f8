//! Instruction types

use {
    crate::{
        error::StakeError, find_mint_authority_pda_with_program,
        find_stake_account_pda_with_program,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        program_error::ProgramError,
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions supported by the Staking program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum StakingInstruction {
    /// Create the caller's stake account PDA
    ///
    /// Accounts expected:
    /// 0. `[writable]` Stake account PDA `["stake_account", signer]`
    /// 1. `[writable, signer]` Owner, pays rent
    /// 2. `[]` System program
    Initialize,
    /// Move lamports from the owner into the stake account
    ///
    /// Accounts expected:
    /// 0. `[writable]` Stake account PDA
    /// 1. `[writable, signer]` Owner
    /// 2. `[]` System program
    Stake {
        /// Lamports to stake
        amount: u64,
    },
    /// Move staked lamports back to the owner
    ///
    /// Accounts expected:
    /// 0. `[writable]` Stake account PDA
    /// 1. `[writable, signer]` Owner
    /// 2. `[]` System program
    Unstake {
        /// Lamports to unstake
        amount: u64,
    },
    /// Mint accrued points as reward tokens
    ///
    /// Accounts expected:
    /// 0. `[writable]` Stake account PDA
    /// 1. `[writable, signer]` Owner
    /// 2. `[writable]` Reward mint
    /// 3. `[]` Mint authority PDA `["mint_authority"]`
    /// 4. `[writable]` Owner's token account for the reward mint
    /// 5. `[]` SPL Token program
    ClaimPoints,
}

impl StakingInstruction {
    /// Unpack a byte array into a StakingInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        borsh::from_slice(input).map_err(|_| StakeError::InvalidInstructionData.into())
    }

    /// Pack the StakingInstruction into a byte array
    pub fn pack(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }
}

fn stake_accounts(program_id: &Pubkey, owner: &Pubkey) -> Vec<AccountMeta> {
    let (stake_account, _bump) = find_stake_account_pda_with_program(program_id, owner);
    vec![
        AccountMeta::new(stake_account, false),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ]
}

/// Creates an `Initialize` instruction.
pub fn initialize(program_id: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: stake_accounts(program_id, owner),
        data: StakingInstruction::Initialize.pack(),
    }
}

/// Creates a `Stake` instruction.
pub fn stake(program_id: &Pubkey, owner: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: stake_accounts(program_id, owner),
        data: StakingInstruction::Stake { amount }.pack(),
    }
}

/// Creates an `Unstake` instruction.
pub fn unstake(program_id: &Pubkey, owner: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: stake_accounts(program_id, owner),
        data: StakingInstruction::Unstake { amount }.pack(),
    }
}

/// Creates a `ClaimPoints` instruction.
pub fn claim_points(
    program_id: &Pubkey,
    owner: &Pubkey,
    reward_mint: &Pubkey,
    user_token_account: &Pubkey,
) -> Instruction {
    let (stake_account, _) = find_stake_account_pda_with_program(program_id, owner);
    let (mint_authority, _) = find_mint_authority_pda_with_program(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(stake_account, false),
            AccountMeta::new(*owner, true),
            AccountMeta::new(*reward_mint, false),
            AccountMeta::new_readonly(mint_authority, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: StakingInstruction::ClaimPoints.pack(),
    }
}
