//! Program state processor

use {
    crate::{error::BasicsError, instruction::BasicsInstruction, state::NewAccount},
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        entrypoint::ProgramResult,
        msg,
        program::invoke,
        program_error::ProgramError,
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
        let instruction = BasicsInstruction::unpack(instruction_data)?;

        match instruction {
            BasicsInstruction::Initialize { data } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, data)
            }
        }
    }

    fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo], data: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let new_account_info = next_account_info(account_info_iter)?;
        let signer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !signer_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        // The account is not program-derived, so only its own key can authorize creation
        if !new_account_info.is_signer {
            return Err(BasicsError::NewAccountNotSigner.into());
        }
        if new_account_info.lamports() != 0 || !new_account_info.data_is_empty() {
            return Err(BasicsError::AccountAlreadyInitialized.into());
        }
        if !system_program::check_id(system_program_info.key) {
            return Err(ProgramError::IncorrectProgramId);
        }

        let rent = Rent::get()?;
        invoke(
            &system_instruction::create_account(
                signer_info.key,
                new_account_info.key,
                rent.minimum_balance(NewAccount::LEN),
                NewAccount::LEN as u64,
                program_id,
            ),
            &[
                signer_info.clone(),
                new_account_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        let record = NewAccount {
            is_initialized: true,
            data,
        };
        NewAccount::pack(record, &mut new_account_info.try_borrow_mut_data()?)?;

        msg!("Stored {} in {}", data, new_account_info.key);
        Ok(())
    }
}
