//! JSON fixtures that seed an [`InMemoryLedger`].
//!
//! Amounts are raw integer units written as decimal strings, addresses are
//! `0x` hex.

use crate::memory::InMemoryLedger;
use anyhow::{Context, Result, anyhow};
use cp_router_domain::{Address, Token, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairFixture {
    pub token_a: Address,
    pub token_b: Address,
    /// Pool account.
    pub address: Address,
    pub reserve_a: String,
    pub reserve_b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceFixture {
    /// `None` for the native asset.
    #[serde(default)]
    pub token: Option<Address>,
    pub owner: Address,
    pub amount: String,
}

/// Ledger seed: pools, balances and token metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerFixture {
    pub factory: Address,
    pub wrapped_native: Address,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pairs: Vec<PairFixture>,
    #[serde(default)]
    pub balances: Vec<BalanceFixture>,
}

impl LedgerFixture {
    /// Reads a fixture from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    /// Looks up token metadata by address.
    #[must_use]
    pub fn token(&self, address: &Address) -> Option<&Token> {
        self.tokens.iter().find(|t| &t.address == address)
    }

    /// Looks up token metadata by symbol, case-insensitively.
    #[must_use]
    pub fn token_by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Builds a ledger holding every pool and balance of the fixture.
    pub async fn build_ledger(&self) -> Result<InMemoryLedger> {
        let ledger = InMemoryLedger::new(self.factory, self.wrapped_native);

        for pair in &self.pairs {
            ledger
                .create_pair(
                    pair.token_a,
                    pair.token_b,
                    pair.address,
                    parse_raw(&pair.reserve_a)?,
                    parse_raw(&pair.reserve_b)?,
                )
                .await
                .with_context(|| format!("seeding pair {:?}", pair.address))?;
        }

        for balance in &self.balances {
            let amount = parse_raw(&balance.amount)?;
            match balance.token {
                Some(token) => ledger.mint(token, balance.owner, amount).await?,
                None => ledger.mint_native(balance.owner, amount).await?,
            }
        }

        info!(
            pairs = self.pairs.len(),
            balances = self.balances.len(),
            "Ledger seeded from fixture"
        );
        Ok(ledger)
    }
}

fn parse_raw(value: &str) -> Result<U256> {
    U256::from_dec_str(value.trim()).map_err(|_| anyhow!("invalid raw amount {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReserveOracle;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "factory": "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f",
        "wrapped_native": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
        "tokens": [
            {
                "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "symbol": "WETH",
                "decimals": 18
            },
            {
                "address": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
                "symbol": "UNI",
                "decimals": 18
            }
        ],
        "pairs": [
            {
                "token_a": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "token_b": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
                "address": "0xd3d2e2692501a5c9ca623199d38826e513033a17",
                "reserve_a": "1000000000000000000000",
                "reserve_b": "300000000000000000000000"
            }
        ],
        "balances": [
            {
                "owner": "0x6cc5f688a315f3dc28a7781717a9a798a59fda7b",
                "amount": "5000000000000000000"
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_fixture_build_ledger() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let fixture = LedgerFixture::load(file.path()).unwrap();
        assert_eq!(fixture.token_by_symbol("uni").unwrap().decimals, 18);

        let ledger = fixture.build_ledger().await.unwrap();
        let weth = fixture.wrapped_native;
        let uni = fixture.token_by_symbol("UNI").unwrap().address;

        let (r_weth, r_uni) = ledger.get_reserves(weth, uni).await.unwrap();
        assert_eq!(r_weth, U256::from_dec_str("1000000000000000000000").unwrap());
        assert_eq!(r_uni, U256::from_dec_str("300000000000000000000000").unwrap());

        let owner = fixture.balances[0].owner;
        assert_eq!(
            ledger.native_balance_of(owner).await,
            U256::from(5_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_bad_amount_is_reported() {
        assert!(parse_raw("12x").is_err());
    }
}
