//! Account and token identifiers.

use crate::error::{RouterError, RouterResult};
use primitive_types::H160;

/// 20-byte account or token identifier.
pub type Address = H160;

/// Parses a `0x`-prefixed (or bare) 40 character hex string.
pub fn parse_address(value: &str) -> RouterResult<Address> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(digits)
        .map_err(|e| RouterError::InvalidConfig(format!("invalid address {value}: {e}")))?;
    if bytes.len() != 20 {
        return Err(RouterError::InvalidConfig(format!(
            "invalid address {value}: expected 20 bytes, got {}",
            bytes.len()
        )));
    }

    Ok(Address::from_slice(&bytes))
}

/// Formats an address as lowercase `0x` hex.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}
