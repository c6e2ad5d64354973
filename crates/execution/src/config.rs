//! Router construction parameters.

use cp_router_domain::{Address, ProtocolFee, RouterError, RouterResult, parse_address};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable names read by [`RouterConfig::from_env`].
pub const ENV_ROUTER: &str = "ROUTER_ADDRESS";
pub const ENV_FACTORY: &str = "ROUTER_FACTORY";
pub const ENV_WRAPPED_NATIVE: &str = "ROUTER_WRAPPED_NATIVE";
pub const ENV_FEE_RECIPIENT: &str = "ROUTER_FEE_RECIPIENT";
pub const ENV_PROTOCOL_FEE_BPS: &str = "ROUTER_PROTOCOL_FEE_BPS";

/// Immutable router configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Account the router settles through (receives the last pool output
    /// and the attached native value before paying out).
    pub router: Address,
    /// Factory the reserve oracle must be bound to.
    pub factory: Address,
    /// Wrapped native token used by the native variants.
    pub wrapped_native: Address,
    /// Destination of the protocol fee.
    pub fee_recipient: Address,
    /// Protocol fee in basis points, below 10000.
    pub protocol_fee_bps: u32,
}

impl RouterConfig {
    /// Checks every field and returns the validated protocol fee.
    ///
    /// # Errors
    /// `InvalidConfig` for a zero address, a fee of 10000 bps or more, or a
    /// fee recipient equal to the router account.
    pub fn validate(&self) -> RouterResult<ProtocolFee> {
        for (name, address) in [
            ("router", self.router),
            ("factory", self.factory),
            ("wrapped_native", self.wrapped_native),
            ("fee_recipient", self.fee_recipient),
        ] {
            if address.is_zero() {
                return Err(RouterError::InvalidConfig(format!(
                    "{name} must not be the zero address"
                )));
            }
        }
        if self.fee_recipient == self.router {
            return Err(RouterError::InvalidConfig(
                "fee_recipient must differ from the router account".to_string(),
            ));
        }
        ProtocolFee::new(self.protocol_fee_bps)
    }

    /// Reads the configuration from `ROUTER_*` environment variables.
    pub fn from_env() -> RouterResult<Self> {
        let config = Self {
            router: env_address(ENV_ROUTER)?,
            factory: env_address(ENV_FACTORY)?,
            wrapped_native: env_address(ENV_WRAPPED_NATIVE)?,
            fee_recipient: env_address(ENV_FEE_RECIPIENT)?,
            protocol_fee_bps: env_var(ENV_PROTOCOL_FEE_BPS)?.trim().parse().map_err(|e| {
                RouterError::InvalidConfig(format!("{ENV_PROTOCOL_FEE_BPS}: {e}"))
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn env_var(name: &str) -> RouterResult<String> {
    env::var(name).map_err(|_| RouterError::InvalidConfig(format!("{name} must be set")))
}

fn env_address(name: &str) -> RouterResult<Address> {
    parse_address(&env_var(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RouterConfig {
        RouterConfig {
            router: Address::repeat_byte(0x10),
            factory: Address::repeat_byte(0x20),
            wrapped_native: Address::repeat_byte(0x30),
            fee_recipient: Address::repeat_byte(0x40),
            protocol_fee_bps: 50,
        }
    }

    #[test]
    fn test_validate_ok() {
        let fee = config().validate().unwrap();
        assert_eq!(fee.bps(), 50);
    }

    #[test]
    fn test_validate_rejects_fee_out_of_range() {
        let config = RouterConfig {
            protocol_fee_bps: 10_000,
            ..config()
        };
        assert_eq!(config.validate().unwrap_err().code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_validate_rejects_zero_addresses() {
        let config = RouterConfig {
            fee_recipient: Address::zero(),
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize() {
        let raw = r#"{
            "router": "0x1010101010101010101010101010101010101010",
            "factory": "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f",
            "wrapped_native": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "fee_recipient": "0xe42b1f6be2ddb834615943f2b41242b172788e7e",
            "protocol_fee_bps": 50
        }"#;
        let config: RouterConfig = serde_json::from_str(raw).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.fee_recipient,
            parse_address("0xe42B1F6BE2DDb834615943F2b41242B172788E7E").unwrap()
        );
    }
}
