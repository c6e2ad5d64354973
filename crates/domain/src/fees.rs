use crate::error::{RouterError, RouterResult};
use crate::math::fixed_point::{checked_add, checked_sub, mul_div};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Basis point denominator.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Protocol fee taken once per swap, on the final output leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFee {
    bps: u32,
}

impl ProtocolFee {
    /// Creates a fee of `bps` basis points. Must be below 10000.
    pub fn new(bps: u32) -> RouterResult<Self> {
        if bps >= BPS_DENOMINATOR {
            return Err(RouterError::InvalidConfig(format!(
                "protocol fee {bps} bps must be below {BPS_DENOMINATOR}"
            )));
        }
        Ok(Self { bps })
    }

    #[must_use]
    pub fn bps(&self) -> u32 {
        self.bps
    }

    /// Splits a gross pool output into `(net, fee)`, with
    /// `fee = floor(gross * bps / 10000)`.
    pub fn deduct(&self, gross: U256) -> RouterResult<(U256, U256)> {
        let fee = mul_div(gross, U256::from(self.bps), U256::from(BPS_DENOMINATOR))?;
        Ok((checked_sub(gross, fee)?, fee))
    }

    /// Smallest gross output whose [`deduct`](Self::deduct) leaves at least `net`.
    ///
    /// `deduct` keeps `ceil(gross * (10000 - bps) / 10000)`, which reaches `net`
    /// as soon as `gross * (10000 - bps) > (net - 1) * 10000`.
    pub fn gross_up(&self, net: U256) -> RouterResult<U256> {
        if net.is_zero() {
            return Ok(U256::zero());
        }
        let below = mul_div(
            net - 1,
            U256::from(BPS_DENOMINATOR),
            U256::from(BPS_DENOMINATOR - self.bps),
        )?;
        checked_add(below, U256::one())
    }
}
