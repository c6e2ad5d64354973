use crate::address::{Address, format_address};
use crate::error::{RouterError, RouterResult};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token metadata. Only used for display; the router itself works on addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Converts a human readable amount ("0.01") to raw units.
    pub fn parse_units(&self, value: &str) -> RouterResult<U256> {
        parse_units(value, self.decimals)
    }

    /// Converts raw units to a decimal for display.
    pub fn format_units(&self, raw: U256) -> RouterResult<Decimal> {
        let mut value = crate::math::constant_product::to_decimal(raw)?;
        value
            .set_scale(u32::from(self.decimals))
            .map_err(|_| RouterError::ArithmeticOverflow)?;
        Ok(value.normalize())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, format_address(&self.address))
    }
}

/// Parses a decimal string such as `"0.01"` into raw units with `decimals`
/// fractional digits. Extra fractional digits are rejected rather than truncated.
pub fn parse_units(value: &str, decimals: u8) -> RouterResult<U256> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(RouterError::InvalidConfig(format!("invalid amount {value:?}")));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(RouterError::InvalidConfig(format!(
            "amount {value} has more than {decimals} decimals"
        )));
    }

    let digits = format!("{whole}{fraction:0<width$}", width = usize::from(decimals));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits)
        .map_err(|_| RouterError::InvalidConfig(format!("invalid amount {value:?}")))
}
