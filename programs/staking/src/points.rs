//! Points accrual

use crate::{error::StakeError, state::StakeAccount};

/// Micro-points earned per staked SOL per day
pub const POINTS_PER_SOL_PER_DAY: u64 = 1_000_000;
/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
/// Seconds in one day
pub const SECONDS_PER_DAY: u64 = 86_400;
/// Decimals of the reward mint; one micro-point is one base unit
pub const TOKEN_DECIMALS: u8 = 6;

/// Accrue points for the time elapsed since the last update and move the
/// update time to `current_time`.
pub fn update_points(account: &mut StakeAccount, current_time: i64) -> Result<(), StakeError> {
    let elapsed = current_time
        .checked_sub(account.last_update_time)
        .filter(|elapsed| *elapsed >= 0)
        .ok_or(StakeError::InvalidTimestamp)? as u64;

    if elapsed > 0 && account.staked_amount > 0 {
        let earned = calculate_points_earned(account.staked_amount, elapsed)?;
        account.total_points = account
            .total_points
            .checked_add(earned)
            .ok_or(StakeError::Overflow)?;
    }

    account.last_update_time = current_time;
    Ok(())
}

/// Micro-points earned by `staked_amount` lamports over `elapsed_seconds`.
pub fn calculate_points_earned(staked_amount: u64, elapsed_seconds: u64) -> Result<u64, StakeError> {
    let points = (staked_amount as u128)
        .checked_mul(elapsed_seconds as u128)
        .and_then(|v| v.checked_mul(POINTS_PER_SOL_PER_DAY as u128))
        .and_then(|v| v.checked_div(LAMPORTS_PER_SOL as u128))
        .and_then(|v| v.checked_div(SECONDS_PER_DAY as u128))
        .ok_or(StakeError::Overflow)?;

    u64::try_from(points).map_err(|_| StakeError::Overflow)
}
