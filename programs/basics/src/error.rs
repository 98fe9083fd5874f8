//! Error types

use {
    num_derive::FromPrimitive,
    solana_program::{
        decode_error::DecodeError,
        msg,
        program_error::{PrintProgramError, ProgramError},
    },
    thiserror::Error,
};

/// Errors that may be returned by the Basics program.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum BasicsError {
    // 0
    /// The account being created did not sign the transaction
    #[error("New account must sign the transaction")]
    NewAccountNotSigner,
    /// The account being created already holds lamports or data
    #[error("Account already initialized")]
    AccountAlreadyInitialized,
    /// Invalid instruction data
    #[error("Invalid instruction data")]
    InvalidInstructionData,
}

impl From<BasicsError> for ProgramError {
    fn from(e: BasicsError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for BasicsError {
    fn type_of() -> &'static str {
        "BasicsError"
    }
}

impl PrintProgramError for BasicsError {
    fn print<E>(&self)
    where
        E: 'static
            + std::error::Error
            + DecodeError<E>
            + PrintProgramError
            + num_traits::FromPrimitive,
    {
        match self {
            BasicsError::NewAccountNotSigner => msg!("Error: New account must sign the transaction"),
            BasicsError::AccountAlreadyInitialized => msg!("Error: Account already initialized"),
            BasicsError::InvalidInstructionData => msg!("Error: Invalid instruction data"),
        }
    }
}
