//! Program state processor

use {
    crate::{
        error::StakeError,
        find_mint_authority_pda_with_program, find_stake_account_pda_with_program,
        instruction::StakingInstruction,
        points::update_points,
        state::StakeAccount,
        MINT_AUTHORITY_SEED, STAKE_ACCOUNT_SEED,
    },
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        clock::Clock,
        entrypoint::ProgramResult,
        msg,
        program::{invoke, invoke_signed},
        program_error::ProgramError,
        program_option::COption,
        program_pack::Pack,
        pubkey::Pubkey,
        rent::Rent,
        system_instruction, system_program,
        sysvar::Sysvar,
    },
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
        let instruction = StakingInstruction::unpack(instruction_data)?;

        match instruction {
            StakingInstruction::Initialize => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts)
            }
            StakingInstruction::Stake { amount } => {
                msg!("Instruction: Stake");
                Self::process_stake(program_id, accounts, amount)
            }
            StakingInstruction::Unstake { amount } => {
                msg!("Instruction: Unstake");
                Self::process_unstake(program_id, accounts, amount)
            }
            StakingInstruction::ClaimPoints => {
                msg!("Instruction: ClaimPoints");
                Self::process_claim_points(program_id, accounts)
            }
        }
    }

    fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let stake_account_info = next_account_info(account_info_iter)?;
        let signer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !signer_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if !system_program::check_id(system_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }
        let (expected, bump) = find_stake_account_pda_with_program(program_id, signer_info.key);
        if expected != *stake_account_info.key {
            return Err(StakeError::InvalidStakeAccount.into());
        }
        // Lamports alone do not make the address taken; anyone can send them
        if !stake_account_info.data_is_empty()
            || !system_program::check_id(stake_account_info.owner)
        {
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        create_pda_account(
            signer_info,
            stake_account_info,
            system_program_info,
            program_id,
            StakeAccount::LEN,
            &[STAKE_ACCOUNT_SEED, signer_info.key.as_ref(), &[bump]],
        )?;

        let stake_account = StakeAccount {
            is_initialized: true,
            owner: *signer_info.key,
            staked_amount: 0,
            total_points: 0,
            last_update_time: 0,
            bump,
        };
        StakeAccount::pack(stake_account, &mut stake_account_info.try_borrow_mut_data()?)?;

        msg!("User stake account created successfully");
        Ok(())
    }

    fn process_stake(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let stake_account_info = next_account_info(account_info_iter)?;
        let signer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }
        let mut stake_account =
            Self::load_owned_stake_account(program_id, stake_account_info, signer_info)?;
        if !system_program::check_id(system_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }

        let clock = Clock::get()?;
        update_points(&mut stake_account, clock.unix_timestamp)?;

        invoke(
            &system_instruction::transfer(signer_info.key, stake_account_info.key, amount),
            &[
                signer_info.clone(),
                stake_account_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        stake_account.staked_amount = stake_account
            .staked_amount
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        StakeAccount::pack(stake_account, &mut stake_account_info.try_borrow_mut_data()?)?;

        msg!(
            "Staked {} lamports. Total staked: {}, Total points: {}",
            amount,
            stake_account.staked_amount,
            stake_account.total_points
        );
        Ok(())
    }

    fn process_unstake(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let stake_account_info = next_account_info(account_info_iter)?;
        let signer_info = next_account_info(account_info_iter)?;

        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }
        let mut stake_account =
            Self::load_owned_stake_account(program_id, stake_account_info, signer_info)?;
        if stake_account.staked_amount < amount {
            return Err(StakeError::InsufficientStake.into());
        }

        let clock = Clock::get()?;
        update_points(&mut stake_account, clock.unix_timestamp)?;

        // The PDA carries data, so the system program cannot debit it; the
        // owning program moves the lamports directly.
        let remaining = stake_account_info
            .lamports()
            .checked_sub(amount)
            .ok_or(StakeError::Underflow)?;
        let credited = signer_info
            .lamports()
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        **stake_account_info.try_borrow_mut_lamports()? = remaining;
        **signer_info.try_borrow_mut_lamports()? = credited;

        stake_account.staked_amount = stake_account
            .staked_amount
            .checked_sub(amount)
            .ok_or(StakeError::Underflow)?;
        StakeAccount::pack(stake_account, &mut stake_account_info.try_borrow_mut_data()?)?;

        msg!(
            "Unstaked {} lamports. Remaining staked: {}, Total points: {}",
            amount,
            stake_account.staked_amount,
            stake_account.total_points
        );
        Ok(())
    }

    fn process_claim_points(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let stake_account_info = next_account_info(account_info_iter)?;
        let signer_info = next_account_info(account_info_iter)?;
        let reward_mint_info = next_account_info(account_info_iter)?;
        let mint_authority_info = next_account_info(account_info_iter)?;
        let user_token_account_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        let mut stake_account =
            Self::load_owned_stake_account(program_id, stake_account_info, signer_info)?;
        if !spl_token::check_id(token_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }

        let (authority, authority_bump) = find_mint_authority_pda_with_program(program_id);
        if authority != *mint_authority_info.key {
            return Err(StakeError::InvalidMintAuthority.into());
        }
        if reward_mint_info.owner != token_program_info.key {
            return Err(ProgramError::IncorrectProgramId);
        }
        let mint = spl_token::state::Mint::unpack(&reward_mint_info.try_borrow_data()?)?;
        if mint.mint_authority != COption::Some(authority) {
            return Err(StakeError::InvalidMintAuthority.into());
        }

        if user_token_account_info.owner != token_program_info.key {
            return Err(StakeError::InvalidTokenAccount.into());
        }
        let token_account =
            spl_token::state::Account::unpack(&user_token_account_info.try_borrow_data()?)?;
        if token_account.mint != *reward_mint_info.key {
            return Err(StakeError::InvalidTokenAccount.into());
        }
        if token_account.owner != *signer_info.key {
            return Err(StakeError::InvalidOwner.into());
        }

        let clock = Clock::get()?;
        update_points(&mut stake_account, clock.unix_timestamp)?;

        let reward_amount = stake_account.total_points;
        if reward_amount == 0 {
            return Err(StakeError::InsufficientTokenPoints.into());
        }

        invoke_signed(
            &spl_token::instruction::mint_to(
                token_program_info.key,
                reward_mint_info.key,
                user_token_account_info.key,
                mint_authority_info.key,
                &[],
                reward_amount,
            )?,
            &[
                reward_mint_info.clone(),
                user_token_account_info.clone(),
                mint_authority_info.clone(),
                token_program_info.clone(),
            ],
            &[&[MINT_AUTHORITY_SEED, &[authority_bump]]],
        )?;

        stake_account.total_points = 0;
        StakeAccount::pack(stake_account, &mut stake_account_info.try_borrow_mut_data()?)?;

        msg!("Minted {} reward tokens to user", reward_amount);
        Ok(())
    }

    /// Validates the stake account PDA against its owner and returns its state
    fn load_owned_stake_account(
        program_id: &Pubkey,
        stake_account_info: &AccountInfo,
        signer_info: &AccountInfo,
    ) -> Result<StakeAccount, ProgramError> {
        if !signer_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if stake_account_info.owner != program_id {
            return Err(StakeError::InvalidStakeAccount.into());
        }
        let stake_account = StakeAccount::unpack(&stake_account_info.try_borrow_data()?)?;
        if stake_account.owner != *signer_info.key {
            return Err(StakeError::Unauthorized.into());
        }
        let expected = Pubkey::create_program_address(
            &[
                STAKE_ACCOUNT_SEED,
                signer_info.key.as_ref(),
                &[stake_account.bump],
            ],
            program_id,
        )
        .map_err(|_| StakeError::InvalidStakeAccount)?;
        if expected != *stake_account_info.key {
            return Err(StakeError::InvalidStakeAccount.into());
        }
        Ok(stake_account)
    }
}

/// Creates `account` at a PDA owned by `owner`, funded to rent exemption by
/// `payer`. Lamports already sitting at the address are kept and topped up.
fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    account: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    owner: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let required = Rent::get()?.minimum_balance(space);

    if account.lamports() == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                payer.key,
                account.key,
                required,
                space as u64,
                owner,
            ),
            &[payer.clone(), account.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    let top_up = required.saturating_sub(account.lamports());
    if top_up > 0 {
        invoke(
            &system_instruction::transfer(payer.key, account.key, top_up),
            &[payer.clone(), account.clone(), system_program.clone()],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(account.key, space as u64),
        &[account.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(account.key, owner),
        &[account.clone(), system_program.clone()],
        &[signer_seeds],
    )
}
