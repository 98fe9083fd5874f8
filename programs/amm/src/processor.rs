//! Program state processor

use {
    crate::{
        error::AmmError,
        find_lp_mint_pda_with_program, find_pool_authority_pda_with_program,
        find_pool_pda_with_program, find_reserve_a_pda_with_program,
        find_reserve_b_pda_with_program,
        instruction::AmmInstruction,
        math::{deposit_lp_tokens, swap_output, withdraw_amounts},
        state::Pool,
        AUTHORITY_SEED, LP_DECIMALS, LP_MINT_SEED, POOL_SEED, RESERVE_A_SEED, RESERVE_B_SEED,
    },
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        entrypoint::ProgramResult,
        msg,
        program::{invoke, invoke_signed},
        program_error::ProgramError,
        program_pack::Pack,
        pubkey::Pubkey,
        rent::Rent,
        system_instruction, system_program,
        sysvar::Sysvar,
    },
    spl_token::state::{Account as TokenAccount, Mint},
};

/// Program state handler.
pub struct Processor {}

impl Processor {
    /// Process a single instruction
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = AmmInstruction::unpack(instruction_data)?;

        match instruction {
            AmmInstruction::Initialize => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts)
            }
            AmmInstruction::Deposit {
                quantity_a,
                quantity_b,
            } => {
                msg!("Instruction: Deposit");
                Self::process_deposit(program_id, accounts, quantity_a, quantity_b)
            }
            AmmInstruction::Swap { quantity, a_to_b } => {
                msg!("Instruction: Swap");
                Self::process_swap(program_id, accounts, quantity, a_to_b)
            }
            AmmInstruction::Withdraw { lp_token_quantity } => {
                msg!("Instruction: Withdraw");
                Self::process_withdraw(program_id, accounts, lp_token_quantity)
            }
        }
    }

    fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let pool_info = next_account_info(account_info_iter)?;
        let reserve_a_info = next_account_info(account_info_iter)?;
        let reserve_b_info = next_account_info(account_info_iter)?;
        let authority_info = next_account_info(account_info_iter)?;
        let mint_a_info = next_account_info(account_info_iter)?;
        let mint_b_info = next_account_info(account_info_iter)?;
        let lp_mint_info = next_account_info(account_info_iter)?;
        let payer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !system_program::check_id(system_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }
        if !spl_token::check_id(token_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }

        let (mint_a, mint_b) = (mint_a_info.key, mint_b_info.key);
        if mint_a == mint_b {
            return Err(AmmError::SameTokenMint.into());
        }
        for mint_info in [mint_a_info, mint_b_info] {
            if mint_info.owner != token_program_info.key {
                return Err(ProgramError::IncorrectProgramId);
            }
            Mint::unpack(&mint_info.try_borrow_data()?)?;
        }

        let (pool, pool_bump) = find_pool_pda_with_program(program_id, mint_a, mint_b);
        let (reserve_a, reserve_a_bump) =
            find_reserve_a_pda_with_program(program_id, mint_a, mint_b);
        let (reserve_b, reserve_b_bump) =
            find_reserve_b_pda_with_program(program_id, mint_a, mint_b);
        let (authority, authority_bump) =
            find_pool_authority_pda_with_program(program_id, mint_a, mint_b);
        let (lp_mint, lp_mint_bump) = find_lp_mint_pda_with_program(program_id, mint_a, mint_b);
        if pool != *pool_info.key
            || reserve_a != *reserve_a_info.key
            || reserve_b != *reserve_b_info.key
            || authority != *authority_info.key
            || lp_mint != *lp_mint_info.key
        {
            return Err(AmmError::InvalidPoolAccount.into());
        }
        if !pool_info.data_is_empty() || !system_program::check_id(pool_info.owner) {
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let pair: [&[u8]; 2] = [mint_a.as_ref(), mint_b.as_ref()];
        let creator = PdaCreator {
            payer: payer_info,
            system_program: system_program_info,
        };

        creator.create(
            pool_info,
            program_id,
            Pool::LEN,
            &[POOL_SEED, pair[0], pair[1], &[pool_bump]],
        )?;

        for (reserve_info, mint_info, seed, bump) in [
            (reserve_a_info, mint_a_info, RESERVE_A_SEED, reserve_a_bump),
            (reserve_b_info, mint_b_info, RESERVE_B_SEED, reserve_b_bump),
        ] {
            creator.create(
                reserve_info,
                token_program_info.key,
                TokenAccount::LEN,
                &[seed, pair[0], pair[1], &[bump]],
            )?;
            invoke(
                &spl_token::instruction::initialize_account3(
                    token_program_info.key,
                    reserve_info.key,
                    mint_info.key,
                    &authority,
                )?,
                &[
                    reserve_info.clone(),
                    mint_info.clone(),
                    token_program_info.clone(),
                ],
            )?;
        }

        creator.create(
            lp_mint_info,
            token_program_info.key,
            Mint::LEN,
            &[LP_MINT_SEED, pair[0], pair[1], &[lp_mint_bump]],
        )?;
        invoke(
            &spl_token::instruction::initialize_mint2(
                token_program_info.key,
                &lp_mint,
                &authority,
                Some(&authority),
                LP_DECIMALS,
            )?,
            &[lp_mint_info.clone(), token_program_info.clone()],
        )?;

        let pool_state = Pool {
            is_initialized: true,
            token_a_mint: *mint_a,
            token_b_mint: *mint_b,
            lp_mint,
            reserve_a,
            reserve_b,
            pool_authority: authority,
            authority_bump,
            lp_supply: 0,
        };
        Pool::pack(pool_state, &mut pool_info.try_borrow_mut_data()?)?;

        msg!("Pool created for {} / {}", mint_a, mint_b);
        Ok(())
    }

    fn process_deposit(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        quantity_a: u64,
        quantity_b: u64,
    ) -> ProgramResult {
        let accs = LiquidityAccounts::parse(accounts)?;
        let mut pool = Self::load_pool(program_id, accs.pool)?;
        Self::check_pool_accounts(&pool, &accs)?;
        Self::check_user_token_account(accs.user_a, &pool.token_a_mint)?;
        Self::check_user_token_account(accs.user_b, &pool.token_b_mint)?;
        Self::check_user_token_account(accs.user_lp, &pool.lp_mint)?;

        let reserve_a = token_amount(accs.reserve_a)?;
        let reserve_b = token_amount(accs.reserve_b)?;
        let lp_tokens =
            deposit_lp_tokens(quantity_a, quantity_b, reserve_a, reserve_b, pool.lp_supply)?;

        for (source, reserve, amount) in [
            (accs.user_a, accs.reserve_a, quantity_a),
            (accs.user_b, accs.reserve_b, quantity_b),
        ] {
            transfer_from_user(accs.token_program, source, reserve, accs.user, amount)?;
        }
        invoke_signed(
            &spl_token::instruction::mint_to(
                accs.token_program.key,
                accs.lp_mint.key,
                accs.user_lp.key,
                accs.authority.key,
                &[],
                lp_tokens,
            )?,
            &[
                accs.lp_mint.clone(),
                accs.user_lp.clone(),
                accs.authority.clone(),
                accs.token_program.clone(),
            ],
            &[&authority_seeds(&pool)[..]],
        )?;

        pool.lp_supply = pool
            .lp_supply
            .checked_add(lp_tokens)
            .ok_or(AmmError::ArithmeticOverflow)?;
        Pool::pack(pool, &mut accs.pool.try_borrow_mut_data()?)?;

        msg!(
            "Deposited {} A and {} B for {} LP tokens",
            quantity_a,
            quantity_b,
            lp_tokens
        );
        Ok(())
    }

    fn process_swap(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        quantity: u64,
        a_to_b: bool,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let pool_info = next_account_info(account_info_iter)?;
        let user_a_info = next_account_info(account_info_iter)?;
        let user_b_info = next_account_info(account_info_iter)?;
        let reserve_a_info = next_account_info(account_info_iter)?;
        let reserve_b_info = next_account_info(account_info_iter)?;
        let authority_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;
        let user_info = next_account_info(account_info_iter)?;

        if !user_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !spl_token::check_id(token_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }
        let pool = Self::load_pool(program_id, pool_info)?;
        if pool.reserve_a != *reserve_a_info.key
            || pool.reserve_b != *reserve_b_info.key
            || pool.pool_authority != *authority_info.key
        {
            return Err(AmmError::PoolAccountMismatch.into());
        }
        Self::check_user_token_account(user_a_info, &pool.token_a_mint)?;
        Self::check_user_token_account(user_b_info, &pool.token_b_mint)?;
        if pool.lp_supply == 0 {
            return Err(AmmError::InvalidLiquidity.into());
        }

        let (user_in, reserve_in, reserve_out, user_out) = if a_to_b {
            (user_a_info, reserve_a_info, reserve_b_info, user_b_info)
        } else {
            (user_b_info, reserve_b_info, reserve_a_info, user_a_info)
        };
        let out = swap_output(quantity, token_amount(reserve_in)?, token_amount(reserve_out)?)?;

        transfer_from_user(token_program_info, user_in, reserve_in, user_info, quantity)?;
        transfer_from_reserve(
            token_program_info,
            reserve_out,
            user_out,
            authority_info,
            &pool,
            out,
        )?;

        msg!("Swapped {} in for {} out", quantity, out);
        Ok(())
    }

    fn process_withdraw(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        lp_token_quantity: u64,
    ) -> ProgramResult {
        let accs = LiquidityAccounts::parse(accounts)?;
        let mut pool = Self::load_pool(program_id, accs.pool)?;
        Self::check_pool_accounts(&pool, &accs)?;
        Self::check_user_token_account(accs.user_a, &pool.token_a_mint)?;
        Self::check_user_token_account(accs.user_b, &pool.token_b_mint)?;
        let user_lp = Self::check_user_token_account(accs.user_lp, &pool.lp_mint)?;

        let (amount_a, amount_b) = withdraw_amounts(
            lp_token_quantity,
            token_amount(accs.reserve_a)?,
            token_amount(accs.reserve_b)?,
            pool.lp_supply,
        )?;

        invoke(
            &spl_token::instruction::burn(
                accs.token_program.key,
                accs.user_lp.key,
                accs.lp_mint.key,
                accs.user.key,
                &[],
                lp_token_quantity,
            )?,
            &[
                accs.user_lp.clone(),
                accs.lp_mint.clone(),
                accs.user.clone(),
                accs.token_program.clone(),
            ],
        )?;
        pool.lp_supply = pool
            .lp_supply
            .checked_sub(lp_token_quantity)
            .ok_or(AmmError::ArithmeticOverflow)?;

        for (reserve, destination, amount) in [
            (accs.reserve_a, accs.user_a, amount_a),
            (accs.reserve_b, accs.user_b, amount_b),
        ] {
            transfer_from_reserve(
                accs.token_program,
                reserve,
                destination,
                accs.authority,
                &pool,
                amount,
            )?;
        }

        if user_lp.amount == lp_token_quantity {
            invoke(
                &spl_token::instruction::close_account(
                    accs.token_program.key,
                    accs.user_lp.key,
                    accs.user.key,
                    accs.user.key,
                    &[],
                )?,
                &[
                    accs.user_lp.clone(),
                    accs.user.clone(),
                    accs.user.clone(),
                    accs.token_program.clone(),
                ],
            )?;
        }

        Pool::pack(pool, &mut accs.pool.try_borrow_mut_data()?)?;

        msg!(
            "Withdrew {} A and {} B for {} LP tokens",
            amount_a,
            amount_b,
            lp_token_quantity
        );
        Ok(())
    }

    fn load_pool(program_id: &Pubkey, pool_info: &AccountInfo) -> Result<Pool, ProgramError> {
        if pool_info.owner != program_id {
            return Err(AmmError::InvalidPoolAccount.into());
        }
        Pool::unpack(&pool_info.try_borrow_data()?)
            .map_err(|_| AmmError::InvalidPoolAccount.into())
    }

    fn check_pool_accounts(pool: &Pool, accs: &LiquidityAccounts) -> ProgramResult {
        if !accs.user.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !spl_token::check_id(accs.token_program.key) {
            return Err(ProgramError::IncorrectProgramId);
        }
        if pool.reserve_a != *accs.reserve_a.key
            || pool.reserve_b != *accs.reserve_b.key
            || pool.lp_mint != *accs.lp_mint.key
            || pool.pool_authority != *accs.authority.key
        {
            return Err(AmmError::PoolAccountMismatch.into());
        }
        Ok(())
    }

    /// Checks a user token account is an SPL token account for `mint`
    fn check_user_token_account(
        account_info: &AccountInfo,
        mint: &Pubkey,
    ) -> Result<TokenAccount, ProgramError> {
        if !spl_token::check_id(account_info.owner) {
            return Err(AmmError::InvalidTokenAccount.into());
        }
        let account = TokenAccount::unpack(&account_info.try_borrow_data()?)
            .map_err(|_| AmmError::InvalidTokenAccount)?;
        if account.mint != *mint {
            return Err(AmmError::InvalidTokenAccount.into());
        }
        Ok(account)
    }
}

/// Accounts shared by `Deposit` and `Withdraw`, in instruction order.
struct LiquidityAccounts<'a, 'b> {
    pool: &'a AccountInfo<'b>,
    user_a: &'a AccountInfo<'b>,
    user_b: &'a AccountInfo<'b>,
    user_lp: &'a AccountInfo<'b>,
    reserve_a: &'a AccountInfo<'b>,
    reserve_b: &'a AccountInfo<'b>,
    authority: &'a AccountInfo<'b>,
    lp_mint: &'a AccountInfo<'b>,
    token_program: &'a AccountInfo<'b>,
    user: &'a AccountInfo<'b>,
}

impl<'a, 'b> LiquidityAccounts<'a, 'b> {
    fn parse(accounts: &'a [AccountInfo<'b>]) -> Result<Self, ProgramError> {
        let account_info_iter = &mut accounts.iter();
        Ok(Self {
            pool: next_account_info(account_info_iter)?,
            user_a: next_account_info(account_info_iter)?,
            user_b: next_account_info(account_info_iter)?,
            user_lp: next_account_info(account_info_iter)?,
            reserve_a: next_account_info(account_info_iter)?,
            reserve_b: next_account_info(account_info_iter)?,
            authority: next_account_info(account_info_iter)?,
            lp_mint: next_account_info(account_info_iter)?,
            token_program: next_account_info(account_info_iter)?,
            user: next_account_info(account_info_iter)?,
        })
    }
}

fn authority_seeds(pool: &Pool) -> [&[u8]; 4] {
    [
        AUTHORITY_SEED,
        pool.token_a_mint.as_ref(),
        pool.token_b_mint.as_ref(),
        std::slice::from_ref(&pool.authority_bump),
    ]
}

fn token_amount(account_info: &AccountInfo) -> Result<u64, ProgramError> {
    Ok(TokenAccount::unpack(&account_info.try_borrow_data()?)?.amount)
}

fn transfer_from_user<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    user: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    invoke(
        &spl_token::instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            user.key,
            &[],
            amount,
        )?,
        &[
            source.clone(),
            destination.clone(),
            user.clone(),
            token_program.clone(),
        ],
    )
}

fn transfer_from_reserve<'a>(
    token_program: &AccountInfo<'a>,
    reserve: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    pool: &Pool,
    amount: u64,
) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    invoke_signed(
        &spl_token::instruction::transfer(
            token_program.key,
            reserve.key,
            destination.key,
            authority.key,
            &[],
            amount,
        )?,
        &[
            reserve.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
        &[&authority_seeds(pool)[..]],
    )
}

/// Creates rent-exempt PDAs paid for by one payer.
struct PdaCreator<'a, 'b> {
    payer: &'a AccountInfo<'b>,
    system_program: &'a AccountInfo<'b>,
}

impl<'b> PdaCreator<'_, 'b> {
    /// Creates `account` owned by `owner`. Lamports already sitting at the
    /// address are kept and topped up.
    fn create(
        &self,
        account: &AccountInfo<'b>,
        owner: &Pubkey,
        space: usize,
        signer_seeds: &[&[u8]],
    ) -> ProgramResult {
        let required = Rent::get()?.minimum_balance(space);

        if account.lamports() == 0 {
            return invoke_signed(
                &system_instruction::create_account(
                    self.payer.key,
                    account.key,
                    required,
                    space as u64,
                    owner,
                ),
                &[
                    self.payer.clone(),
                    account.clone(),
                    self.system_program.clone(),
                ],
                &[signer_seeds],
            );
        }

        let top_up = required.saturating_sub(account.lamports());
        if top_up > 0 {
            invoke(
                &system_instruction::transfer(self.payer.key, account.key, top_up),
                &[
                    self.payer.clone(),
                    account.clone(),
                    self.system_program.clone(),
                ],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(account.key, space as u64),
            &[account.clone(), self.system_program.clone()],
            &[signer_seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(account.key, owner),
            &[account.clone(), self.system_program.clone()],
            &[signer_seeds],
        )
    }
}
