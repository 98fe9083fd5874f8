//! Constant-product pool arithmetic

use crate::error::AmmError;

fn to_u64(value: u128) -> Result<u64, AmmError> {
    u64::try_from(value).map_err(|_| AmmError::ArithmeticOverflow)
}

/// Integer square root, rounded down.
pub fn isqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    // Newton's method from an upper bound; converges monotonically downward
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}

/// LP tokens issued for depositing `quantity_a` and `quantity_b` into a pool
/// holding `reserve_a`/`reserve_b` with `lp_supply` tokens outstanding.
///
/// The first deposit (no LP outstanding) sets the price and is issued
/// `sqrt(quantity_a * quantity_b)`. Later deposits must match the current
/// ratio exactly and are issued LP in proportion to the pool they add.
pub fn deposit_lp_tokens(
    quantity_a: u64,
    quantity_b: u64,
    reserve_a: u64,
    reserve_b: u64,
    lp_supply: u64,
) -> Result<u64, AmmError> {
    if quantity_a == 0 || quantity_b == 0 {
        return Err(AmmError::InvalidQuantity);
    }

    let lp = if lp_supply == 0 {
        to_u64(isqrt(quantity_a as u128 * quantity_b as u128))?
    } else {
        if reserve_a == 0 || reserve_b == 0 {
            return Err(AmmError::ArithmeticOverflow);
        }
        if quantity_a as u128 * reserve_b as u128 != quantity_b as u128 * reserve_a as u128 {
            return Err(AmmError::InvalidLiquidity);
        }
        let lp_a = to_u64(lp_supply as u128 * quantity_a as u128 / reserve_a as u128)?;
        let lp_b = to_u64(lp_supply as u128 * quantity_b as u128 / reserve_b as u128)?;
        if lp_a != lp_b {
            return Err(AmmError::InvalidLiquidity);
        }
        lp_a
    };

    if lp == 0 {
        return Err(AmmError::InvalidLiquidity);
    }
    Ok(lp)
}

/// Tokens paid out for `quantity` paid in, keeping `reserve_in * reserve_out`
/// from decreasing: `reserve_out * quantity / (reserve_in + quantity)`.
pub fn swap_output(quantity: u64, reserve_in: u64, reserve_out: u64) -> Result<u64, AmmError> {
    if quantity == 0 {
        return Err(AmmError::InvalidQuantity);
    }
    let denominator = (reserve_in as u128)
        .checked_add(quantity as u128)
        .ok_or(AmmError::ArithmeticOverflow)?;
    let out = to_u64(reserve_out as u128 * quantity as u128 / denominator)?;
    if out == 0 {
        return Err(AmmError::InvalidQuantity);
    }
    Ok(out)
}

/// Shares of each reserve returned for burning `lp_token_quantity`.
pub fn withdraw_amounts(
    lp_token_quantity: u64,
    reserve_a: u64,
    reserve_b: u64,
    lp_supply: u64,
) -> Result<(u64, u64), AmmError> {
    if lp_token_quantity == 0 || lp_token_quantity > lp_supply {
        return Err(AmmError::InvalidQuantity);
    }
    let amount_a = to_u64(lp_token_quantity as u128 * reserve_a as u128 / lp_supply as u128)?;
    let amount_b = to_u64(lp_token_quantity as u128 * reserve_b as u128 / lp_supply as u128)?;
    Ok((amount_a, amount_b))
}
