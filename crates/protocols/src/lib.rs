//! External collaborators of the router.
//!
//! The router never reaches for global state. It is handed two capabilities:
//! - a [`ReserveOracle`] that reports pair reserves
//! - a [`TokenTransferService`] that moves balances and wraps the native asset
//!
//! [`memory::InMemoryLedger`] implements both for tests and local simulation.

pub mod fixture;
pub mod memory;
pub mod transfer;

pub use transfer::{ReserveSnapshot, TransferPlan, TransferStep};

use async_trait::async_trait;
use cp_router_domain::{Address, RouterResult, U256};

/// Source of pair reserves.
#[async_trait]
pub trait ReserveOracle: Send + Sync {
    /// Factory this oracle resolves pairs for.
    fn factory(&self) -> Address;

    /// Address of the pool holding `token_a`/`token_b`.
    ///
    /// Fails with `PairNotFound` when no pool exists.
    async fn pair_for(&self, token_a: Address, token_b: Address) -> RouterResult<Address>;

    /// Current reserves, ordered as the arguments: `(reserve_a, reserve_b)`.
    ///
    /// Fails with `PairNotFound` when no pool exists.
    async fn get_reserves(&self, token_a: Address, token_b: Address)
    -> RouterResult<(U256, U256)>;
}

/// Balance movement, wrapping and unwrapping of the native asset.
#[async_trait]
pub trait TokenTransferService: Send + Sync {
    /// The wrapped native token this service wraps into.
    fn wrapped_native(&self) -> Address;

    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> RouterResult<()>;

    /// Converts `amount` of `account`'s native balance into wrapped native.
    async fn wrap_native(&self, account: Address, amount: U256) -> RouterResult<()>;

    /// Converts `amount` of `account`'s wrapped native back into native.
    async fn unwrap_native(&self, account: Address, amount: U256) -> RouterResult<()>;

    async fn transfer_native(&self, from: Address, to: Address, amount: U256) -> RouterResult<()>;

    /// Executes every step of `plan` in order.
    ///
    /// The default runs the steps one by one and stops at the first failure.
    /// Implementations backed by a ledger with transactions should override it
    /// so a failing plan leaves no partial effect, and check the plan's
    /// reserve snapshots under the same lock the steps are applied with.
    async fn settle(&self, plan: &TransferPlan) -> RouterResult<()> {
        for step in plan.steps() {
            match *step {
                TransferStep::Transfer {
                    token,
                    from,
                    to,
                    amount,
                } => self.transfer_from(token, from, to, amount).await?,
                TransferStep::WrapNative { account, amount } => {
                    self.wrap_native(account, amount).await?
                }
                TransferStep::UnwrapNative { account, amount } => {
                    self.unwrap_native(account, amount).await?
                }
                TransferStep::TransferNative { from, to, amount } => {
                    self.transfer_native(from, to, amount).await?
                }
            }
        }
        Ok(())
    }
}
