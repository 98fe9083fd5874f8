//! Basics – Rust SDK (client-side helpers)
//!
//! This crate provides:
//! - Instruction builders for the Basics, Staking and AMM programs with correct account ordering
//! - Transaction builders for common flows (compose Vec<Instruction>)
//! - A [`Ledger`] abstraction over the cluster connection, with an RPC implementation
//! - Readers that fetch and decode program accounts
//! - [`InitializeScenario`], the end-to-end airdrop → initialize → verify flow
//!
//! Signers, recent blockhashes, and submission are left to the caller unless a
//! [`Ledger`] is involved.

pub mod config;
pub mod ledger;
pub mod reader;
pub mod scenario;

pub use config::LedgerConfig;
pub use ledger::{Ledger, RpcLedger};
pub use amm::instruction::UserTokenAccounts;
pub use reader::{read_new_account, read_pool, read_stake_account};
pub use scenario::{InitializeScenario, ScenarioConfig, ScenarioReport};

use solana_sdk::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey, system_instruction};

/// Thin client for building instructions for the Basics program.
///
/// The `program_id` must be the deployed Basics program id.
#[derive(Clone, Copy, Debug)]
pub struct BasicsClient {
    pub program_id: Pubkey,
}

impl BasicsClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Build an Initialize instruction.
    ///
    /// Accounts (strict order):
    /// - new_account (writable, signer)
    /// - signer (writable, signer)
    /// - system_program (readonly)
    pub fn initialize_ix(&self, params: InitializeParams) -> Instruction {
        basics::instruction::initialize(
            &self.program_id,
            &params.new_account,
            &params.signer,
            params.data,
        )
    }
}

/// Thin client for building PDAs and instructions for the Staking program.
#[derive(Clone, Copy, Debug)]
pub struct StakingClient {
    pub program_id: Pubkey,
}

impl StakingClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Derive the stake account PDA for an owner.
    pub fn stake_account_pda(&self, owner: &Pubkey) -> Pubkey {
        let (pda, _bump) = staking::find_stake_account_pda_with_program(&self.program_id, owner);
        pda
    }

    /// Derive the reward mint authority PDA.
    pub fn mint_authority_pda(&self) -> Pubkey {
        let (pda, _bump) = staking::find_mint_authority_pda_with_program(&self.program_id);
        pda
    }

    /// Build an Initialize instruction creating the owner's stake account.
    pub fn initialize_ix(&self, owner: Pubkey) -> Instruction {
        staking::instruction::initialize(&self.program_id, &owner)
    }

    /// Build a Stake instruction.
    pub fn stake_ix(&self, owner: Pubkey, amount: u64) -> anyhow::Result<Instruction> {
        anyhow::ensure!(amount > 0, "stake amount must be greater than 0");
        Ok(staking::instruction::stake(&self.program_id, &owner, amount))
    }

    /// Build an Unstake instruction.
    pub fn unstake_ix(&self, owner: Pubkey, amount: u64) -> anyhow::Result<Instruction> {
        anyhow::ensure!(amount > 0, "unstake amount must be greater than 0");
        Ok(staking::instruction::unstake(&self.program_id, &owner, amount))
    }

    /// Build a ClaimPoints instruction.
    ///
    /// Accounts (strict order):
    /// - stake_account (writable)
    /// - owner (writable, signer)
    /// - reward_mint (writable)
    /// - mint_authority PDA (readonly)
    /// - user_token_account (writable)
    /// - token_program (readonly)
    pub fn claim_points_ix(&self, params: ClaimPointsParams) -> Instruction {
        staking::instruction::claim_points(
            &self.program_id,
            &params.owner,
            &params.reward_mint,
            &params.user_token_account,
        )
    }

    // Upstream SPL Token program helpers
    /// Create and initialize the reward mint with the program's mint authority PDA.
    ///
    /// `lamports` must cover rent exemption for `spl_token::state::Mint::LEN` bytes.
    /// Returns: [create_account, initialize_mint2]. The mint keypair must sign.
    pub fn create_reward_mint_tx(
        &self,
        payer: Pubkey,
        mint: Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Vec<Instruction>> {
        let create_ix = system_instruction::create_account(
            &payer,
            &mint,
            lamports,
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        );
        let init_ix = spl_token::instruction::initialize_mint2(
            &spl_token::id(),
            &mint,
            &self.mint_authority_pda(),
            None,
            staking::points::TOKEN_DECIMALS,
        )?;
        Ok(vec![create_ix, init_ix])
    }

    /// Create and initialize a token account for the reward mint.
    ///
    /// See [`create_token_account_tx`].
    pub fn create_token_account_tx(
        &self,
        payer: Pubkey,
        account: Pubkey,
        mint: Pubkey,
        owner: Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Vec<Instruction>> {
        create_token_account_tx(payer, account, mint, owner, lamports)
    }

    /// Create the stake account and stake into it in one sequence.
    /// Returns: [initialize, stake].
    pub fn initialize_and_stake_tx(
        &self,
        owner: Pubkey,
        amount: u64,
    ) -> anyhow::Result<Vec<Instruction>> {
        Ok(vec![self.initialize_ix(owner), self.stake_ix(owner, amount)?])
    }
}

/// Thin client for building PDAs and instructions for the AMM program.
///
/// Every pool is keyed by its ordered mint pair; `(a, b)` and `(b, a)` are
/// different pools.
#[derive(Clone, Copy, Debug)]
pub struct AmmClient {
    pub program_id: Pubkey,
}

impl AmmClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Derive the pool state PDA.
    pub fn pool_pda(&self, token_a_mint: &Pubkey, token_b_mint: &Pubkey) -> Pubkey {
        amm::find_pool_pda_with_program(&self.program_id, token_a_mint, token_b_mint).0
    }

    /// Derive the token A reserve PDA.
    pub fn reserve_a_pda(&self, token_a_mint: &Pubkey, token_b_mint: &Pubkey) -> Pubkey {
        amm::find_reserve_a_pda_with_program(&self.program_id, token_a_mint, token_b_mint).0
    }

    /// Derive the token B reserve PDA.
    pub fn reserve_b_pda(&self, token_a_mint: &Pubkey, token_b_mint: &Pubkey) -> Pubkey {
        amm::find_reserve_b_pda_with_program(&self.program_id, token_a_mint, token_b_mint).0
    }

    /// Derive the pool authority PDA.
    pub fn pool_authority_pda(&self, token_a_mint: &Pubkey, token_b_mint: &Pubkey) -> Pubkey {
        amm::find_pool_authority_pda_with_program(&self.program_id, token_a_mint, token_b_mint).0
    }

    /// Derive the LP mint PDA.
    pub fn lp_mint_pda(&self, token_a_mint: &Pubkey, token_b_mint: &Pubkey) -> Pubkey {
        amm::find_lp_mint_pda_with_program(&self.program_id, token_a_mint, token_b_mint).0
    }

    /// Build an Initialize instruction creating the pool, both reserves and
    /// the LP mint. Fails client-side for identical mints.
    pub fn initialize_ix(&self, params: CreatePoolParams) -> anyhow::Result<Instruction> {
        anyhow::ensure!(
            params.token_a_mint != params.token_b_mint,
            "pool mints must differ"
        );
        Ok(amm::instruction::initialize(
            &self.program_id,
            &params.token_a_mint,
            &params.token_b_mint,
            &params.payer,
        ))
    }

    /// Build a Deposit instruction.
    ///
    /// Accounts (strict order):
    /// - pool (writable)
    /// - user token A, token B and LP accounts (writable)
    /// - reserve A, reserve B (writable)
    /// - pool authority PDA (readonly)
    /// - LP mint (writable)
    /// - token_program (readonly)
    /// - user (signer)
    pub fn deposit_ix(&self, params: DepositParams) -> anyhow::Result<Instruction> {
        anyhow::ensure!(
            params.quantity_a > 0 && params.quantity_b > 0,
            "deposit quantities must be greater than 0"
        );
        Ok(amm::instruction::deposit(
            &self.program_id,
            &params.token_a_mint,
            &params.token_b_mint,
            &params.user,
            params.quantity_a,
            params.quantity_b,
        ))
    }

    /// Build a Swap instruction paying `quantity` of A for B when `a_to_b`,
    /// or of B for A otherwise.
    pub fn swap_ix(&self, params: SwapParams) -> anyhow::Result<Instruction> {
        anyhow::ensure!(params.quantity > 0, "swap quantity must be greater than 0");
        Ok(amm::instruction::swap(
            &self.program_id,
            &params.token_a_mint,
            &params.token_b_mint,
            &params.user,
            params.quantity,
            params.a_to_b,
        ))
    }

    /// Build a Withdraw instruction. Burning the whole LP balance also
    /// closes the user's LP token account.
    pub fn withdraw_ix(&self, params: WithdrawParams) -> anyhow::Result<Instruction> {
        anyhow::ensure!(
            params.lp_token_quantity > 0,
            "withdraw quantity must be greater than 0"
        );
        Ok(amm::instruction::withdraw(
            &self.program_id,
            &params.token_a_mint,
            &params.token_b_mint,
            &params.user,
            params.lp_token_quantity,
        ))
    }

    /// Create and initialize the user's token account for the pool's LP mint.
    ///
    /// See [`create_token_account_tx`].
    pub fn create_lp_token_account_tx(
        &self,
        payer: Pubkey,
        account: Pubkey,
        pool: (&Pubkey, &Pubkey),
        owner: Pubkey,
        lamports: u64,
    ) -> anyhow::Result<Vec<Instruction>> {
        let lp_mint = self.lp_mint_pda(pool.0, pool.1);
        create_token_account_tx(payer, account, lp_mint, owner, lamports)
    }
}

// Upstream SPL Token program helpers
/// Create and initialize a plain SPL token account.
///
/// `lamports` must cover rent exemption for `spl_token::state::Account::LEN` bytes.
/// Returns: [create_account, initialize_account3]. The account keypair must sign.
pub fn create_token_account_tx(
    payer: Pubkey,
    account: Pubkey,
    mint: Pubkey,
    owner: Pubkey,
    lamports: u64,
) -> anyhow::Result<Vec<Instruction>> {
    let create_ix = system_instruction::create_account(
        &payer,
        &account,
        lamports,
        spl_token::state::Account::LEN as u64,
        &spl_token::id(),
    );
    let init_ix =
        spl_token::instruction::initialize_account3(&spl_token::id(), &account, &mint, &owner)?;
    Ok(vec![create_ix, init_ix])
}

// === Params ===
/// Parameters for the Basics Initialize instruction.
#[derive(Clone, Copy, Debug)]
pub struct InitializeParams {
    /// Fresh account to create; must sign
    pub new_account: Pubkey,
    /// Payer and authority; must sign
    pub signer: Pubkey,
    /// Value stored in the new account
    pub data: u64,
}

/// Parameters for the Staking ClaimPoints instruction.
#[derive(Clone, Copy, Debug)]
pub struct ClaimPointsParams {
    /// Stake account owner (must sign)
    pub owner: Pubkey,
    /// Reward mint whose authority is the program PDA
    pub reward_mint: Pubkey,
    /// Owner's token account for the reward mint
    pub user_token_account: Pubkey,
}

/// Parameters for the AMM Initialize instruction.
#[derive(Clone, Copy, Debug)]
pub struct CreatePoolParams {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    /// Pays rent for the pool, reserves and LP mint; must sign
    pub payer: Pubkey,
}

/// Parameters for the AMM Deposit instruction.
#[derive(Clone, Copy, Debug)]
pub struct DepositParams {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    /// Depositor and its token accounts; `user.lp` must already exist
    pub user: UserTokenAccounts,
    pub quantity_a: u64,
    pub quantity_b: u64,
}

/// Parameters for the AMM Swap instruction.
#[derive(Clone, Copy, Debug)]
pub struct SwapParams {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    /// Trader and its token accounts; `user.lp` is not used
    pub user: UserTokenAccounts,
    /// Base units paid in
    pub quantity: u64,
    /// Pay A and receive B when set
    pub a_to_b: bool,
}

/// Parameters for the AMM Withdraw instruction.
#[derive(Clone, Copy, Debug)]
pub struct WithdrawParams {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub user: UserTokenAccounts,
    /// LP tokens to burn
    pub lp_token_quantity: u64,
}
