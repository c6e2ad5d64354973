use crate::address::Address;
use crate::error::{RouterError, RouterResult};
use crate::math::fixed_point::{checked_add, checked_mul, checked_sub, mul_div};
use primitive_types::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

/// LP fee kept by every pool, as `997 / 1000` of the input (0.3%).
pub const LP_FEE_NUMERATOR: u64 = 997;
pub const LP_FEE_DENOMINATOR: u64 = 1000;

/// Returns the pair's tokens in canonical (ascending) order.
pub fn sort_tokens(token_a: Address, token_b: Address) -> RouterResult<(Address, Address)> {
    if token_a == token_b {
        return Err(RouterError::InvalidPath("identical addresses"));
    }
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    if token0.is_zero() {
        return Err(RouterError::InvalidPath("zero address"));
    }
    Ok((token0, token1))
}

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula: dy = y * dx / (x + dx)
/// taking fee into account: dy = y * dx * 997 / (x * 1000 + dx * 997)
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> RouterResult<U256> {
    if amount_in.is_zero() {
        return Err(RouterError::ZeroAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouterError::InsufficientLiquidity);
    }

    let amount_in_with_fee = checked_mul(amount_in, U256::from(LP_FEE_NUMERATOR))?;
    let denominator = checked_add(
        checked_mul(reserve_in, U256::from(LP_FEE_DENOMINATOR))?,
        amount_in_with_fee,
    )?;

    mul_div(amount_in_with_fee, reserve_out, denominator)
}

/// Calculates the input required to take `amount_out` out of a constant product pool.
///
/// formula: dx = x * dy * 1000 / ((y - dy) * 997) + 1
///
/// The trailing `+ 1` rounds against the caller, so paying the returned amount
/// always yields at least `amount_out`.
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> RouterResult<U256> {
    if amount_out.is_zero() {
        return Err(RouterError::ZeroAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RouterError::InsufficientLiquidity);
    }
    if amount_out >= reserve_out {
        return Err(RouterError::InsufficientLiquidity);
    }

    let numerator = checked_mul(reserve_in, U256::from(LP_FEE_DENOMINATOR))?;
    let denominator = checked_mul(
        checked_sub(reserve_out, amount_out)?,
        U256::from(LP_FEE_NUMERATOR),
    )?;

    checked_add(mul_div(numerator, amount_out, denominator)?, U256::one())
}

/// Calculates the spot price of token_in in terms of token_out
/// Price = reserve_out / reserve_in
///
/// Display only. Settlement never reads this.
pub fn spot_price(reserve_in: U256, reserve_out: U256) -> RouterResult<Decimal> {
    let r_in = to_decimal(reserve_in)?;
    let r_out = to_decimal(reserve_out)?;

    if r_in.is_zero() {
        return Err(RouterError::InsufficientLiquidity);
    }

    r_out
        .checked_div(r_in)
        .ok_or(RouterError::ArithmeticOverflow)
}

/// Converts a raw integer amount to a decimal. Fails for values above the
/// 96-bit mantissa of `Decimal`.
pub fn to_decimal(value: U256) -> RouterResult<Decimal> {
    Decimal::from_str(&value.to_string()).map_err(|_| RouterError::ArithmeticOverflow)
}
