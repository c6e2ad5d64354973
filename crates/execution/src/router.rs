//! Swap orchestrator.
//!
//! Every entry point runs the same linear protocol, and any failure ends the
//! call with nothing settled:
//! 1. deadline check
//! 2. path validation for the variant's native endpoint
//! 3. quote from fresh reserves, then the caller's bound
//! 4. one transfer plan, settled atomically by the transfer service against
//!    the reserves the quote read

use crate::clock::Clock;
use crate::config::RouterConfig;
use crate::quote::{QuoteEngine, SwapQuote};
use crate::receipt::{SwapReceipt, SwapVariant};
use cp_router_domain::math::fixed_point::checked_sub;
use cp_router_domain::{Address, RouterError, RouterResult, U256, validate_path};
use cp_router_protocols::{
    ReserveOracle, ReserveSnapshot, TokenTransferService, TransferPlan, TransferStep,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Caller intent for one swap call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub variant: SwapVariant,
    /// Exact side of the swap: input for exact-input variants, output otherwise.
    pub amount: U256,
    /// Minimum output (exact-input) or maximum input (exact-output).
    pub bound: U256,
    pub path: Vec<Address>,
    /// Account paying the input.
    pub caller: Address,
    /// Account receiving the output.
    pub to: Address,
    /// Unix seconds; the call fails once the clock is past it.
    pub deadline: u64,
    /// Native value attached to the call. Zero for token-in variants.
    pub value: U256,
}

/// Constant-product swap router.
pub struct SwapRouter {
    config: RouterConfig,
    quotes: QuoteEngine,
    oracle: Arc<dyn ReserveOracle>,
    transfers: Arc<dyn TokenTransferService>,
    clock: Arc<dyn Clock>,
}

impl SwapRouter {
    /// Creates a router over the given collaborators.
    ///
    /// # Errors
    /// `InvalidConfig` when the configuration is invalid or the collaborators
    /// are bound to a different factory or wrapped native token.
    pub fn new(
        config: RouterConfig,
        oracle: Arc<dyn ReserveOracle>,
        transfers: Arc<dyn TokenTransferService>,
        clock: Arc<dyn Clock>,
    ) -> RouterResult<Self> {
        let fee = config.validate()?;
        if oracle.factory() != config.factory {
            return Err(RouterError::InvalidConfig(format!(
                "reserve oracle is bound to factory {:?}, expected {:?}",
                oracle.factory(),
                config.factory
            )));
        }
        if transfers.wrapped_native() != config.wrapped_native {
            return Err(RouterError::InvalidConfig(format!(
                "transfer service wraps into {:?}, expected {:?}",
                transfers.wrapped_native(),
                config.wrapped_native
            )));
        }

        info!(
            router = ?config.router,
            factory = ?config.factory,
            fee_recipient = ?config.fee_recipient,
            protocol_fee_bps = fee.bps(),
            "Router initialized"
        );

        Ok(Self {
            quotes: QuoteEngine::new(oracle.clone(), fee),
            config,
            oracle,
            transfers,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn quote_engine(&self) -> &QuoteEngine {
        &self.quotes
    }

    /// Read-only quote for selling exactly `amount_in`.
    pub async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: &[Address],
    ) -> RouterResult<Vec<U256>> {
        self.quotes.get_amounts_out(amount_in, path).await
    }

    /// Read-only quote for buying exactly `amount_out`.
    pub async fn get_amounts_in(
        &self,
        amount_out: U256,
        path: &[Address],
    ) -> RouterResult<Vec<U256>> {
        self.quotes.get_amounts_in(amount_out, path).await
    }

    /// Sells exactly `amount_in` of `path[0]` for at least `amount_out_min` of `path[last]`.
    pub async fn swap_exact_tokens_for_tokens(
        &self,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::ExactTokensForTokens,
            amount: amount_in,
            bound: amount_out_min,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value: U256::zero(),
        })
        .await
    }

    /// Buys exactly `amount_out` of `path[last]` for at most `amount_in_max` of `path[0]`.
    pub async fn swap_tokens_for_exact_tokens(
        &self,
        caller: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::TokensForExactTokens,
            amount: amount_out,
            bound: amount_in_max,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value: U256::zero(),
        })
        .await
    }

    /// Sells the attached native `value` for at least `amount_out_min` of `path[last]`.
    /// `path[0]` must be the wrapped native token.
    pub async fn swap_exact_native_for_tokens(
        &self,
        caller: Address,
        value: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::ExactNativeForTokens,
            amount: value,
            bound: amount_out_min,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value,
        })
        .await
    }

    /// Buys exactly `amount_out` of the native asset for at most `amount_in_max`
    /// of `path[0]`. `path[last]` must be the wrapped native token.
    pub async fn swap_tokens_for_exact_native(
        &self,
        caller: Address,
        amount_out: U256,
        amount_in_max: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::TokensForExactNative,
            amount: amount_out,
            bound: amount_in_max,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value: U256::zero(),
        })
        .await
    }

    /// Sells exactly `amount_in` of `path[0]` for at least `amount_out_min` of
    /// the native asset. `path[last]` must be the wrapped native token.
    pub async fn swap_exact_tokens_for_native(
        &self,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::ExactTokensForNative,
            amount: amount_in,
            bound: amount_out_min,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value: U256::zero(),
        })
        .await
    }

    /// Buys exactly `amount_out` of `path[last]` with the attached native
    /// `value`. Fails when `value` does not cover the quoted input; any excess
    /// is refunded to the caller. `path[0]` must be the wrapped native token.
    pub async fn swap_native_for_exact_tokens(
        &self,
        caller: Address,
        value: U256,
        amount_out: U256,
        path: &[Address],
        to: Address,
        deadline: u64,
    ) -> RouterResult<SwapReceipt> {
        self.execute(SwapRequest {
            variant: SwapVariant::NativeForExactTokens,
            amount: amount_out,
            bound: value,
            path: path.to_vec(),
            caller,
            to,
            deadline,
            value,
        })
        .await
    }

    /// Runs one swap call.
    pub async fn execute(&self, request: SwapRequest) -> RouterResult<SwapReceipt> {
        let result = self.try_execute(&request).await;
        if let Err(e) = &result {
            warn!(
                variant = %request.variant,
                caller = ?request.caller,
                code = e.code(),
                error = %e,
                "Swap rejected"
            );
        }
        result
    }

    async fn try_execute(&self, request: &SwapRequest) -> RouterResult<SwapReceipt> {
        let variant = request.variant;

        let now = self.clock.now();
        if now > request.deadline {
            return Err(RouterError::Expired {
                deadline: request.deadline,
                now,
            });
        }

        validate_path(
            &request.path,
            variant.native_endpoint(),
            self.config.wrapped_native,
        )?;

        let quote = self.quote_within_bound(request).await?;
        let refund = if variant.native_in() {
            checked_sub(request.value, quote.amount_in())?
        } else {
            U256::zero()
        };

        let plan = self.build_plan(request, &quote, refund).await?;
        debug!(variant = %variant, steps = plan.len(), "Transfer plan built");
        self.transfers.settle(&plan).await?;

        let receipt = SwapReceipt {
            id: Uuid::new_v4(),
            variant,
            caller: request.caller,
            to: request.to,
            amounts: quote.amounts,
            protocol_fee: quote.protocol_fee,
            fee_recipient: self.config.fee_recipient,
            refund,
            executed_at: now,
        };

        info!(
            id = %receipt.id,
            variant = %variant,
            amount_in = %receipt.amount_in(),
            amount_out = %receipt.amount_out(),
            protocol_fee = %receipt.protocol_fee,
            hops = request.path.len() - 1,
            "Swap settled"
        );
        Ok(receipt)
    }

    async fn quote_within_bound(&self, request: &SwapRequest) -> RouterResult<SwapQuote> {
        if request.variant.is_exact_input() {
            let quote = self.quotes.quote_exact_in(request.amount, &request.path).await?;
            let amount_out = quote.amount_out();
            if amount_out < request.bound || amount_out.is_zero() {
                return Err(RouterError::InsufficientOutputAmount {
                    amount_out,
                    amount_out_min: request.bound,
                });
            }
            Ok(quote)
        } else {
            let quote = self.quotes.quote_exact_out(request.amount, &request.path).await?;
            let amount_in = quote.amount_in();
            if amount_in > request.bound {
                return Err(RouterError::ExcessiveInputAmount {
                    amount_in,
                    amount_in_max: request.bound,
                });
            }
            Ok(quote)
        }
    }

    /// Input leg, pool hops, then the output leg split between the recipient
    /// and the fee recipient. The last pool always pays the router account.
    async fn build_plan(
        &self,
        request: &SwapRequest,
        quote: &SwapQuote,
        refund: U256,
    ) -> RouterResult<TransferPlan> {
        let router = self.config.router;
        let wrapped_native = self.config.wrapped_native;
        let path = &request.path;

        let mut pairs = Vec::with_capacity(path.len() - 1);
        for hop in path.windows(2) {
            pairs.push(self.oracle.pair_for(hop[0], hop[1]).await?);
        }

        let mut plan = TransferPlan::new();
        let amount_in = quote.amount_in();

        if request.variant.native_in() {
            plan.push(TransferStep::TransferNative {
                from: request.caller,
                to: router,
                amount: request.value,
            })
            .push(TransferStep::WrapNative {
                account: router,
                amount: amount_in,
            })
            .push(TransferStep::Transfer {
                token: wrapped_native,
                from: router,
                to: pairs[0],
                amount: amount_in,
            });
        } else {
            plan.push(TransferStep::Transfer {
                token: path[0],
                from: request.caller,
                to: pairs[0],
                amount: amount_in,
            });
        }

        let hops = pairs.iter().zip(&quote.reserves).enumerate();
        for (i, (pair, &(reserve_in, reserve_out))) in hops {
            let to = pairs.get(i + 1).copied().unwrap_or(router);
            plan.expect_reserves(ReserveSnapshot {
                pair: *pair,
                token_in: path[i],
                token_out: path[i + 1],
                reserve_in,
                reserve_out,
            })
            .push(TransferStep::Transfer {
                token: path[i + 1],
                from: *pair,
                to,
                amount: quote.hop_output(i),
            });
        }

        let token_out = path[path.len() - 1];
        let amount_out = quote.amount_out();
        if request.variant.native_out() {
            plan.push(TransferStep::UnwrapNative {
                account: router,
                amount: quote.gross_output,
            })
            .push(TransferStep::TransferNative {
                from: router,
                to: request.to,
                amount: amount_out,
            })
            .push(TransferStep::TransferNative {
                from: router,
                to: self.config.fee_recipient,
                amount: quote.protocol_fee,
            });
        } else {
            plan.push(TransferStep::Transfer {
                token: token_out,
                from: router,
                to: request.to,
                amount: amount_out,
            })
            .push(TransferStep::Transfer {
                token: token_out,
                from: router,
                to: self.config.fee_recipient,
                amount: quote.protocol_fee,
            });
        }

        plan.push(TransferStep::TransferNative {
            from: router,
            to: request.caller,
            amount: refund,
        });

        Ok(plan)
    }
}
