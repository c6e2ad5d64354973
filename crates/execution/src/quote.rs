//! Multi-hop quote engine.
//!
//! Walks a path against reserves read fresh from the oracle on every call.
//! The LP fee applies at every hop; the protocol fee applies exactly once, on
//! the final output leg, after the walk.

use cp_router_domain::math::constant_product::{get_amount_in, get_amount_out};
use cp_router_domain::math::fixed_point::checked_sub;
use cp_router_domain::{Address, ProtocolFee, RouterError, RouterResult, U256, validate_shape};
use cp_router_protocols::ReserveOracle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Full result of a quote walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Per-token amounts, parallel to the path. The first element is the
    /// input, the last is the output after the protocol fee.
    pub amounts: Vec<U256>,
    /// What the last pool releases, before the protocol fee.
    pub gross_output: U256,
    /// `gross_output - amounts[last]`, paid to the fee recipient.
    pub protocol_fee: U256,
    /// `(reserve_in, reserve_out)` read for each hop, in path order.
    pub reserves: Vec<(U256, U256)>,
}

impl SwapQuote {
    #[must_use]
    pub fn amount_in(&self) -> U256 {
        self.amounts.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn amount_out(&self) -> U256 {
        self.amounts.last().copied().unwrap_or_default()
    }

    /// Amount released by the pool at hop `index` (0 based).
    #[must_use]
    pub fn hop_output(&self, index: usize) -> U256 {
        if index + 2 == self.amounts.len() {
            self.gross_output
        } else {
            self.amounts[index + 1]
        }
    }
}

/// Computes swap amounts along a path.
#[derive(Clone)]
pub struct QuoteEngine {
    oracle: Arc<dyn ReserveOracle>,
    fee: ProtocolFee,
}

impl QuoteEngine {
    pub fn new(oracle: Arc<dyn ReserveOracle>, fee: ProtocolFee) -> Self {
        Self { oracle, fee }
    }

    #[must_use]
    pub fn protocol_fee(&self) -> ProtocolFee {
        self.fee
    }

    /// Amounts for selling exactly `amount_in` of `path[0]`.
    pub async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: &[Address],
    ) -> RouterResult<Vec<U256>> {
        Ok(self.quote_exact_in(amount_in, path).await?.amounts)
    }

    /// Amounts for buying exactly `amount_out` of `path[last]`.
    pub async fn get_amounts_in(
        &self,
        amount_out: U256,
        path: &[Address],
    ) -> RouterResult<Vec<U256>> {
        Ok(self.quote_exact_out(amount_out, path).await?.amounts)
    }

    /// Forward walk, left to right. Every division floors.
    ///
    /// # Errors
    /// - `InvalidPath` for a malformed path, before any reserve read
    /// - `ZeroAmount` when `amount_in` is zero
    /// - `InsufficientOutputAmount` when a hop would release nothing
    /// - `InsufficientLiquidity`, `PairNotFound` from the pools
    pub async fn quote_exact_in(
        &self,
        amount_in: U256,
        path: &[Address],
    ) -> RouterResult<SwapQuote> {
        validate_shape(path)?;
        if amount_in.is_zero() {
            return Err(RouterError::ZeroAmount);
        }

        let mut amounts = Vec::with_capacity(path.len());
        let mut reserves = Vec::with_capacity(path.len() - 1);
        amounts.push(amount_in);
        let mut current = amount_in;

        for hop in path.windows(2) {
            let (reserve_in, reserve_out) = self.oracle.get_reserves(hop[0], hop[1]).await?;
            let out = get_amount_out(current, reserve_in, reserve_out)?;
            debug!(
                token_in = ?hop[0],
                token_out = ?hop[1],
                %reserve_in,
                %reserve_out,
                amount_in = %current,
                amount_out = %out,
                "Hop quoted"
            );
            if out.is_zero() {
                return Err(RouterError::InsufficientOutputAmount {
                    amount_out: out,
                    amount_out_min: U256::one(),
                });
            }
            amounts.push(out);
            reserves.push((reserve_in, reserve_out));
            current = out;
        }

        let gross_output = current;
        let (net, protocol_fee) = self.fee.deduct(gross_output)?;
        if let Some(last) = amounts.last_mut() {
            *last = net;
        }

        Ok(SwapQuote {
            amounts,
            gross_output,
            protocol_fee,
            reserves,
        })
    }

    /// Backward walk, right to left. The requested output is first grossed up
    /// by the protocol fee, then every hop rounds its required input up, so
    /// paying `amounts[0]` always delivers at least `amount_out`.
    ///
    /// # Errors
    /// Same as [`quote_exact_in`](Self::quote_exact_in), with
    /// `InsufficientLiquidity` also raised when a pool cannot release the
    /// requested amount.
    pub async fn quote_exact_out(
        &self,
        amount_out: U256,
        path: &[Address],
    ) -> RouterResult<SwapQuote> {
        validate_shape(path)?;
        if amount_out.is_zero() {
            return Err(RouterError::ZeroAmount);
        }

        let gross_output = self.fee.gross_up(amount_out)?;
        let mut amounts = vec![U256::zero(); path.len()];
        let mut reserves = vec![(U256::zero(), U256::zero()); path.len() - 1];
        amounts[path.len() - 1] = gross_output;

        for i in (1..path.len()).rev() {
            let (reserve_in, reserve_out) = self.oracle.get_reserves(path[i - 1], path[i]).await?;
            amounts[i - 1] = get_amount_in(amounts[i], reserve_in, reserve_out)?;
            reserves[i - 1] = (reserve_in, reserve_out);
            debug!(
                token_in = ?path[i - 1],
                token_out = ?path[i],
                %reserve_in,
                %reserve_out,
                amount_in = %amounts[i - 1],
                amount_out = %amounts[i],
                "Hop quoted"
            );
        }

        let protocol_fee = checked_sub(gross_output, amount_out)?;
        amounts[path.len() - 1] = amount_out;

        Ok(SwapQuote {
            amounts,
            gross_output,
            protocol_fee,
            reserves,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_router_protocols::memory::InMemoryLedger;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    const WETH: u8 = 0xee;
    const UNI: u8 = 0x1f;
    const DAI: u8 = 0x6b;

    async fn engine(fee_bps: u32) -> (QuoteEngine, InMemoryLedger) {
        let ledger = InMemoryLedger::new(addr(0xfa), addr(WETH));
        ledger
            .create_pair(addr(WETH), addr(UNI), addr(0x01), units(1_000), units(300_000))
            .await
            .unwrap();
        ledger
            .create_pair(addr(UNI), addr(DAI), addr(0x02), units(500_000), units(1_000_000))
            .await
            .unwrap();
        let engine = QuoteEngine::new(
            Arc::new(ledger.clone()),
            ProtocolFee::new(fee_bps).unwrap(),
        );
        (engine, ledger)
    }

    #[tokio::test]
    async fn test_single_hop_matches_formula() {
        let (engine, _) = engine(50).await;
        let amount_in = units(1) / 100; // 0.01

        let amounts = engine
            .get_amounts_out(amount_in, &[addr(WETH), addr(UNI)])
            .await
            .unwrap();

        let (r_in, r_out) = (units(1_000), units(300_000));
        let with_fee = amount_in * 997;
        let gross = with_fee * r_out / (r_in * 1000 + with_fee);
        let fee = gross * 50 / 10_000;

        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0], amount_in);
        assert_eq!(amounts[1], gross - fee);
    }

    #[tokio::test]
    async fn test_protocol_fee_applied_once_on_final_leg() {
        let (engine, _) = engine(50).await;
        let fee = ProtocolFee::new(50).unwrap();
        let amount_in = units(2);
        let path = [addr(WETH), addr(UNI), addr(DAI)];

        let quote = engine.quote_exact_in(amount_in, &path).await.unwrap();

        let hop1 = get_amount_out(amount_in, units(1_000), units(300_000)).unwrap();
        let hop2 = get_amount_out(hop1, units(500_000), units(1_000_000)).unwrap();
        let (expected, expected_fee) = fee.deduct(hop2).unwrap();
        assert_eq!(quote.amounts, vec![amount_in, hop1, expected]);
        assert_eq!(quote.gross_output, hop2);
        assert_eq!(quote.protocol_fee, expected_fee);
        assert_eq!(
            quote.reserves,
            vec![
                (units(1_000), units(300_000)),
                (units(500_000), units(1_000_000))
            ]
        );

        // Charging the fee at every hop compounds it and gives less.
        let (hop1_net, _) = fee.deduct(hop1).unwrap();
        let hop2_naive = get_amount_out(hop1_net, units(500_000), units(1_000_000)).unwrap();
        let (compounded, _) = fee.deduct(hop2_naive).unwrap();
        assert_ne!(quote.amount_out(), compounded);
        assert!(quote.amount_out() > compounded);
    }

    #[tokio::test]
    async fn test_inverse_rounds_against_caller() {
        let (engine, _) = engine(50).await;
        let forward = [addr(WETH), addr(UNI), addr(DAI)];
        let backward = [addr(DAI), addr(UNI), addr(WETH)];

        for path in [&forward[..], &backward[..]] {
            for wanted in [1u64, 997, 123_456_789, 10_000_000_000_000_000] {
                let wanted = U256::from(wanted);
                let amounts_in = engine.get_amounts_in(wanted, path).await.unwrap();
                let delivered = engine
                    .get_amounts_out(amounts_in[0], path)
                    .await
                    .unwrap();
                assert!(delivered[path.len() - 1] >= wanted);
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip_never_undercharges() {
        let (engine, _) = engine(50).await;
        let path = [addr(WETH), addr(UNI)];

        for amount_in in [units(1) / 100, units(1), units(3) / 7, U256::from(1_000_000_000u64)] {
            let out = engine.get_amounts_out(amount_in, &path).await.unwrap();
            let back = engine.get_amounts_in(out[1], &path).await.unwrap();
            assert!(back[0] >= amount_in);
        }
    }

    #[tokio::test]
    async fn test_exact_out_fee_split() {
        let (engine, _) = engine(50).await;
        let wanted = units(10);
        let quote = engine
            .quote_exact_out(wanted, &[addr(WETH), addr(UNI)])
            .await
            .unwrap();

        assert_eq!(quote.amount_out(), wanted);
        assert_eq!(quote.gross_output, quote.protocol_fee + wanted);
        let (net, fee) = engine.protocol_fee().deduct(quote.gross_output).unwrap();
        assert_eq!(net, wanted);
        assert_eq!(fee, quote.protocol_fee);
    }

    #[tokio::test]
    async fn test_invalid_path_reads_no_reserves() {
        let (engine, ledger) = engine(50).await;

        let err = engine.get_amounts_out(units(1), &[addr(WETH)]).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PATH");
        let err = engine
            .get_amounts_in(units(1), &[addr(WETH), Address::zero()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PATH");

        assert_eq!(ledger.reserve_reads(), 0);
    }

    #[tokio::test]
    async fn test_zero_amount_and_missing_pair() {
        let (engine, _) = engine(50).await;
        let path = [addr(WETH), addr(UNI)];

        assert_eq!(
            engine.get_amounts_out(U256::zero(), &path).await.unwrap_err(),
            RouterError::ZeroAmount
        );
        assert_eq!(
            engine.get_amounts_in(U256::zero(), &path).await.unwrap_err(),
            RouterError::ZeroAmount
        );

        let err = engine
            .get_amounts_out(units(1), &[addr(WETH), addr(DAI)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PAIR_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_exact_out_beyond_reserves() {
        let (engine, _) = engine(0).await;
        let err = engine
            .get_amounts_in(units(300_000), &[addr(WETH), addr(UNI)])
            .await
            .unwrap_err();
        assert_eq!(err, RouterError::InsufficientLiquidity);
    }

    #[tokio::test]
    async fn test_drained_pair_has_no_liquidity() {
        let (engine, ledger) = engine(50).await;
        ledger
            .create_pair(addr(DAI), addr(WETH), addr(0x03), U256::zero(), units(10))
            .await
            .unwrap();

        let err = engine
            .get_amounts_out(units(1), &[addr(UNI), addr(DAI), addr(WETH)])
            .await
            .unwrap_err();
        assert_eq!(err, RouterError::InsufficientLiquidity);

        let err = engine
            .get_amounts_in(units(1), &[addr(DAI), addr(WETH)])
            .await
            .unwrap_err();
        assert_eq!(err, RouterError::InsufficientLiquidity);
    }

    #[tokio::test]
    async fn test_reads_once_per_hop() {
        let (engine, ledger) = engine(50).await;
        let path = [addr(WETH), addr(UNI), addr(DAI)];

        engine.get_amounts_out(units(1), &path).await.unwrap();
        assert_eq!(ledger.reserve_reads(), 2);
        engine.get_amounts_in(units(1), &path).await.unwrap();
        assert_eq!(ledger.reserve_reads(), 4);
    }

    #[tokio::test]
    async fn test_tiny_input_yields_nothing() {
        let (engine, _) = engine(50).await;
        // 1 wei of UNI is worth far less than 1 wei of WETH.
        let err = engine
            .get_amounts_out(U256::one(), &[addr(UNI), addr(WETH)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_OUTPUT_AMOUNT");
    }
}
