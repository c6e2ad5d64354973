//! 256-bit fixed-point helpers with a 512-bit intermediate.
//!
//! All quote math goes through these. Division always floors.

use crate::error::{RouterError, RouterResult};
use primitive_types::{U256, U512};

/// Computes `floor(a * b / denominator)` without overflowing the product.
///
/// The product is formed in 512 bits, so only a quotient that does not fit in
/// 256 bits fails.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> RouterResult<U256> {
    if denominator.is_zero() {
        return Err(RouterError::DivisionByZero);
    }
    let product = a.full_mul(b);
    U256::try_from(product / U512::from(denominator)).map_err(|_| RouterError::ArithmeticOverflow)
}

pub fn checked_add(a: U256, b: U256) -> RouterResult<U256> {
    a.checked_add(b).ok_or(RouterError::ArithmeticOverflow)
}

pub fn checked_sub(a: U256, b: U256) -> RouterResult<U256> {
    a.checked_sub(b).ok_or(RouterError::ArithmeticOverflow)
}

pub fn checked_mul(a: U256, b: U256) -> RouterResult<U256> {
    a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)
}
