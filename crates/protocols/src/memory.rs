//! In-memory ledger acting as both reserve oracle and transfer service.
//!
//! Pool reserves are the pool account's token balances, so a settled swap
//! moves the reserves the next quote reads.

use crate::transfer::{TransferPlan, TransferStep};
use crate::{ReserveOracle, TokenTransferService};
use async_trait::async_trait;
use cp_router_domain::math::constant_product::sort_tokens;
use cp_router_domain::{Address, RouterError, RouterResult, U256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    /// (token, owner) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// owner -> native balance
    native: HashMap<Address, U256>,
    /// (token0, token1) sorted -> pool account
    pairs: HashMap<(Address, Address), Address>,
}

impl LedgerState {
    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn native_balance(&self, owner: Address) -> U256 {
        self.native.get(&owner).copied().unwrap_or_default()
    }

    fn debit(&mut self, token: Address, owner: Address, amount: U256) -> RouterResult<()> {
        let balance = self.balance(token, owner);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            RouterError::TransferFailed(format!(
                "insufficient balance of {token:?} for {owner:?}: has {balance}, needs {amount}"
            ))
        })?;
        self.balances.insert((token, owner), remaining);
        Ok(())
    }

    fn credit(&mut self, token: Address, owner: Address, amount: U256) -> RouterResult<()> {
        let balance = self
            .balance(token, owner)
            .checked_add(amount)
            .ok_or(RouterError::ArithmeticOverflow)?;
        self.balances.insert((token, owner), balance);
        Ok(())
    }

    fn debit_native(&mut self, owner: Address, amount: U256) -> RouterResult<()> {
        let balance = self.native_balance(owner);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            RouterError::TransferFailed(format!(
                "insufficient native balance for {owner:?}: has {balance}, needs {amount}"
            ))
        })?;
        self.native.insert(owner, remaining);
        Ok(())
    }

    fn credit_native(&mut self, owner: Address, amount: U256) -> RouterResult<()> {
        let balance = self
            .native_balance(owner)
            .checked_add(amount)
            .ok_or(RouterError::ArithmeticOverflow)?;
        self.native.insert(owner, balance);
        Ok(())
    }

    fn apply(&mut self, step: &TransferStep, wrapped_native: Address) -> RouterResult<()> {
        match *step {
            TransferStep::Transfer {
                token,
                from,
                to,
                amount,
            } => {
                self.debit(token, from, amount)?;
                self.credit(token, to, amount)
            }
            TransferStep::WrapNative { account, amount } => {
                self.debit_native(account, amount)?;
                self.credit(wrapped_native, account, amount)
            }
            TransferStep::UnwrapNative { account, amount } => {
                self.debit(wrapped_native, account, amount)?;
                self.credit_native(account, amount)
            }
            TransferStep::TransferNative { from, to, amount } => {
                self.debit_native(from, amount)?;
                self.credit_native(to, amount)
            }
        }
    }
}

/// Shared in-memory ledger. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    factory: Address,
    wrapped_native: Address,
    state: Arc<RwLock<LedgerState>>,
    reserve_reads: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    /// Creates an empty ledger bound to a factory and a wrapped native token.
    #[must_use]
    pub fn new(factory: Address, wrapped_native: Address) -> Self {
        Self {
            factory,
            wrapped_native,
            state: Arc::new(RwLock::new(LedgerState::default())),
            reserve_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registers a pool for `token_a`/`token_b` at `pair` and seeds its reserves.
    pub async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
        pair: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> RouterResult<()> {
        let key = sort_tokens(token_a, token_b)?;
        let mut state = self.state.write().await;
        if state.pairs.contains_key(&key) {
            return Err(RouterError::InvalidConfig(format!(
                "pair {token_a:?}/{token_b:?} already exists"
            )));
        }
        state.pairs.insert(key, pair);
        state.credit(token_a, pair, reserve_a)?;
        state.credit(token_b, pair, reserve_b)?;
        debug!(pair = ?pair, %reserve_a, %reserve_b, "Pair created");
        Ok(())
    }

    /// Credits `amount` of `token` to `owner`.
    pub async fn mint(&self, token: Address, owner: Address, amount: U256) -> RouterResult<()> {
        self.state.write().await.credit(token, owner, amount)
    }

    /// Credits `amount` of the native asset to `owner`.
    pub async fn mint_native(&self, owner: Address, amount: U256) -> RouterResult<()> {
        self.state.write().await.credit_native(owner, amount)
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.state.read().await.balance(token, owner)
    }

    pub async fn native_balance_of(&self, owner: Address) -> U256 {
        self.state.read().await.native_balance(owner)
    }

    /// Number of reserve lookups served so far.
    #[must_use]
    pub fn reserve_reads(&self) -> usize {
        self.reserve_reads.load(Ordering::SeqCst)
    }

    async fn apply_one(&self, step: TransferStep) -> RouterResult<()> {
        let mut plan = TransferPlan::new();
        plan.push(step);
        self.settle(&plan).await
    }
}

#[async_trait]
impl ReserveOracle for InMemoryLedger {
    fn factory(&self) -> Address {
        self.factory
    }

    async fn pair_for(&self, token_a: Address, token_b: Address) -> RouterResult<Address> {
        let key = sort_tokens(token_a, token_b)?;
        self.state
            .read()
            .await
            .pairs
            .get(&key)
            .copied()
            .ok_or(RouterError::PairNotFound { token_a, token_b })
    }

    async fn get_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> RouterResult<(U256, U256)> {
        self.reserve_reads.fetch_add(1, Ordering::SeqCst);
        let key = sort_tokens(token_a, token_b)?;
        let state = self.state.read().await;
        let pair = state
            .pairs
            .get(&key)
            .copied()
            .ok_or(RouterError::PairNotFound { token_a, token_b })?;
        Ok((state.balance(token_a, pair), state.balance(token_b, pair)))
    }
}

#[async_trait]
impl TokenTransferService for InMemoryLedger {
    fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> RouterResult<()> {
        self.apply_one(TransferStep::Transfer {
            token,
            from,
            to,
            amount,
        })
        .await
    }

    async fn wrap_native(&self, account: Address, amount: U256) -> RouterResult<()> {
        self.apply_one(TransferStep::WrapNative { account, amount })
            .await
    }

    async fn unwrap_native(&self, account: Address, amount: U256) -> RouterResult<()> {
        self.apply_one(TransferStep::UnwrapNative { account, amount })
            .await
    }

    async fn transfer_native(&self, from: Address, to: Address, amount: U256) -> RouterResult<()> {
        self.apply_one(TransferStep::TransferNative { from, to, amount })
            .await
    }

    /// Applies the whole plan to a staged copy and commits only if every step
    /// succeeds. The write lock is held throughout.
    ///
    /// Before any step runs, every reserve snapshot in the plan must match the
    /// pool's current balances. After the steps, no pool may end with a lower
    /// constant product than it started with.
    async fn settle(&self, plan: &TransferPlan) -> RouterResult<()> {
        let mut state = self.state.write().await;

        for snapshot in plan.snapshots() {
            let reserve_in = state.balance(snapshot.token_in, snapshot.pair);
            let reserve_out = state.balance(snapshot.token_out, snapshot.pair);
            if (reserve_in, reserve_out) != (snapshot.reserve_in, snapshot.reserve_out) {
                warn!(
                    pair = ?snapshot.pair,
                    quoted_in = %snapshot.reserve_in,
                    quoted_out = %snapshot.reserve_out,
                    %reserve_in,
                    %reserve_out,
                    "Settlement rejected, reserves moved since the quote"
                );
                return Err(RouterError::StaleReserves {
                    pair: snapshot.pair,
                });
            }
        }

        let mut staged = state.clone();
        for (index, step) in plan.steps().iter().enumerate() {
            if let Err(e) = staged.apply(step, self.wrapped_native) {
                warn!(step = index, error = %e, "Settlement rejected, nothing applied");
                return Err(e);
            }
        }

        for (&(token0, token1), &pair) in &state.pairs {
            let before = state.balance(token0, pair).full_mul(state.balance(token1, pair));
            let after = staged.balance(token0, pair).full_mul(staged.balance(token1, pair));
            if after < before {
                warn!(pair = ?pair, "Settlement rejected, constant product would decrease");
                return Err(RouterError::TransferFailed(format!(
                    "constant product of pair {pair:?} would decrease"
                )));
            }
        }

        *state = staged;
        debug!(steps = plan.len(), "Plan settled");
        Ok(())
    }
}
