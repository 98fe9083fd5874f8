//! Instruction types

use {
    crate::{
        error::AmmError, find_lp_mint_pda_with_program, find_pool_authority_pda_with_program,
        find_pool_pda_with_program, find_reserve_a_pda_with_program,
        find_reserve_b_pda_with_program,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        program_error::ProgramError,
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions supported by the AMM program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum AmmInstruction {
    /// Create the pool for a mint pair, with its reserves and LP mint
    ///
    /// Accounts expected:
    /// 0. `[writable]` Pool PDA `["amm", mint_a, mint_b]`
    /// 1. `[writable]` Reserve A PDA `["reserve_a", mint_a, mint_b]`
    /// 2. `[writable]` Reserve B PDA `["reserve_b", mint_a, mint_b]`
    /// 3. `[]` Pool authority PDA `["authority", mint_a, mint_b]`
    /// 4. `[]` Token A mint
    /// 5. `[]` Token B mint
    /// 6. `[writable]` LP mint PDA `["lp_mint", mint_a, mint_b]`
    /// 7. `[writable, signer]` Payer
    /// 8. `[]` System program
    /// 9. `[]` SPL Token program
    Initialize,
    /// Add both tokens to the pool in exchange for LP tokens
    ///
    /// Accounts expected:
    /// 0. `[writable]` Pool
    /// 1. `[writable]` User token A account
    /// 2. `[writable]` User token B account
    /// 3. `[writable]` User LP token account
    /// 4. `[writable]` Reserve A
    /// 5. `[writable]` Reserve B
    /// 6. `[]` Pool authority
    /// 7. `[writable]` LP mint
    /// 8. `[]` SPL Token program
    /// 9. `[signer]` User
    Deposit {
        /// Token A base units to deposit
        quantity_a: u64,
        /// Token B base units to deposit
        quantity_b: u64,
    },
    /// Trade one side of the pool for the other
    ///
    /// Accounts expected:
    /// 0. `[]` Pool
    /// 1. `[writable]` User token A account
    /// 2. `[writable]` User token B account
    /// 3. `[writable]` Reserve A
    /// 4. `[writable]` Reserve B
    /// 5. `[]` Pool authority
    /// 6. `[]` SPL Token program
    /// 7. `[signer]` User
    Swap {
        /// Base units paid in
        quantity: u64,
        /// Pay token A and receive token B when set, the reverse otherwise
        a_to_b: bool,
    },
    /// Burn LP tokens for a share of both reserves
    ///
    /// Accounts expected: as `Deposit`, with the user `[writable, signer]`
    /// since an emptied LP token account is closed to it.
    Withdraw {
        /// LP tokens to burn
        lp_token_quantity: u64,
    },
}

impl AmmInstruction {
    /// Unpack a byte array into an AmmInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        borsh::from_slice(input).map_err(|_| AmmError::InvalidInstructionData.into())
    }

    /// Pack the AmmInstruction into a byte array
    pub fn pack(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }
}

/// Token accounts a user trades through. All are plain SPL token accounts
/// owned by `owner`; `lp` is ignored by `swap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTokenAccounts {
    /// Wallet that owns and signs for the token accounts
    pub owner: Pubkey,
    /// Token A account
    pub token_a: Pubkey,
    /// Token B account
    pub token_b: Pubkey,
    /// LP token account
    pub lp: Pubkey,
}

/// Creates an `Initialize` instruction.
pub fn initialize(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
    payer: &Pubkey,
) -> Instruction {
    let (pool, _) = find_pool_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_a, _) = find_reserve_a_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_b, _) = find_reserve_b_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (authority, _) =
        find_pool_authority_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (lp_mint, _) = find_lp_mint_pda_with_program(program_id, token_a_mint, token_b_mint);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(pool, false),
            AccountMeta::new(reserve_a, false),
            AccountMeta::new(reserve_b, false),
            AccountMeta::new_readonly(authority, false),
            AccountMeta::new_readonly(*token_a_mint, false),
            AccountMeta::new_readonly(*token_b_mint, false),
            AccountMeta::new(lp_mint, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: AmmInstruction::Initialize.pack(),
    }
}

fn liquidity_accounts(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
    user: &UserTokenAccounts,
    user_writable: bool,
) -> Vec<AccountMeta> {
    let (pool, _) = find_pool_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_a, _) = find_reserve_a_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_b, _) = find_reserve_b_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (authority, _) =
        find_pool_authority_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (lp_mint, _) = find_lp_mint_pda_with_program(program_id, token_a_mint, token_b_mint);
    vec![
        AccountMeta::new(pool, false),
        AccountMeta::new(user.token_a, false),
        AccountMeta::new(user.token_b, false),
        AccountMeta::new(user.lp, false),
        AccountMeta::new(reserve_a, false),
        AccountMeta::new(reserve_b, false),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new(lp_mint, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        if user_writable {
            AccountMeta::new(user.owner, true)
        } else {
            AccountMeta::new_readonly(user.owner, true)
        },
    ]
}

/// Creates a `Deposit` instruction.
pub fn deposit(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
    user: &UserTokenAccounts,
    quantity_a: u64,
    quantity_b: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: liquidity_accounts(program_id, token_a_mint, token_b_mint, user, false),
        data: AmmInstruction::Deposit {
            quantity_a,
            quantity_b,
        }
        .pack(),
    }
}

/// Creates a `Withdraw` instruction.
pub fn withdraw(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
    user: &UserTokenAccounts,
    lp_token_quantity: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: liquidity_accounts(program_id, token_a_mint, token_b_mint, user, true),
        data: AmmInstruction::Withdraw { lp_token_quantity }.pack(),
    }
}

/// Creates a `Swap` instruction.
pub fn swap(
    program_id: &Pubkey,
    token_a_mint: &Pubkey,
    token_b_mint: &Pubkey,
    user: &UserTokenAccounts,
    quantity: u64,
    a_to_b: bool,
) -> Instruction {
    let (pool, _) = find_pool_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_a, _) = find_reserve_a_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (reserve_b, _) = find_reserve_b_pda_with_program(program_id, token_a_mint, token_b_mint);
    let (authority, _) =
        find_pool_authority_pda_with_program(program_id, token_a_mint, token_b_mint);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(pool, false),
            AccountMeta::new(user.token_a, false),
            AccountMeta::new(user.token_b, false),
            AccountMeta::new(reserve_a, false),
            AccountMeta::new(reserve_b, false),
            AccountMeta::new_readonly(authority, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(user.owner, true),
        ],
        data: AmmInstruction::Swap { quantity, a_to_b }.pack(),
    }
}
