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

/// Errors that may be returned by the AMM program.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum AmmError {
    // 0
    /// Both sides of the pool use the same mint
    #[error("AMM pool must be for 2 different mints")]
    SameTokenMint,
    /// Arithmetic overflow or division by an empty reserve
    #[error("Cannot perform that math operation - arithmetic overflow")]
    ArithmeticOverflow,
    /// Zero or otherwise unusable quantity
    #[error("Invalid quantity specified")]
    InvalidQuantity,
    /// Deposit does not match the pool ratio, or would issue no LP tokens
    #[error("Invalid liquidity specified")]
    InvalidLiquidity,
    /// Pool account is not the PDA of its mints, or not initialized
    #[error("Invalid pool account")]
    InvalidPoolAccount,

    // 5
    /// Reserve, LP mint or authority does not match the pool record
    #[error("Pool account mismatch")]
    PoolAccountMismatch,
    /// User token account is for the wrong mint
    #[error("Invalid token account")]
    InvalidTokenAccount,
    /// Invalid instruction data
    #[error("Invalid instruction data")]
    InvalidInstructionData,
}

impl From<AmmError> for ProgramError {
    fn from(e: AmmError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for AmmError {
    fn type_of() -> &'static str {
        "AmmError"
    }
}

impl PrintProgramError for AmmError {
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
