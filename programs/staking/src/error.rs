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

/// Errors that may be returned by the Staking program.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum StakeError {
    // 0
    /// Amount must be greater than 0
    #[error("Amount must be greater than 0")]
    InvalidAmount,
    /// Insufficient staked amount
    #[error("Insufficient staked amount")]
    InsufficientStake,
    /// Unauthorized access
    #[error("Unauthorized access")]
    Unauthorized,
    /// Arithmetic overflow
    #[error("Arithmetic overflow")]
    Overflow,
    /// Arithmetic underflow
    #[error("Arithmetic underflow")]
    Underflow,

    // 5
    /// Invalid timestamp
    #[error("Invalid timestamp")]
    InvalidTimestamp,
    /// Insufficient points to claim tokens
    #[error("Insufficient points to claim tokens")]
    InsufficientTokenPoints,
    /// Invalid mint authority
    #[error("Invalid mint authority")]
    InvalidMintAuthority,
    /// Invalid token account
    #[error("Invalid token account")]
    InvalidTokenAccount,
    /// Invalid owner
    #[error("Invalid owner")]
    InvalidOwner,

    // 10
    /// Stake account address does not match the expected PDA
    #[error("Invalid stake account")]
    InvalidStakeAccount,
    /// Invalid instruction data
    #[error("Invalid instruction data")]
    InvalidInstructionData,
}

impl From<StakeError> for ProgramError {
    fn from(e: StakeError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for StakeError {
    fn type_of() -> &'static str {
        "StakeError"
    }
}

impl PrintProgramError for StakeError {
    fn print<E>(&self)
    where
        E: 'static
            + std::error::Error
            + DecodeError<E>
            + PrintProgramError
            + num_traits::FromPrimitive,
    {
        msg!("Error: {}", self);
    }
}
