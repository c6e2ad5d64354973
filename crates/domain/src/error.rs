//! Error taxonomy shared by every router crate.

use crate::address::Address;
use primitive_types::U256;

/// Result alias used across the router.
pub type RouterResult<T> = Result<T, RouterError>;

/// Every way a quote or a swap call can fail.
///
/// A failure always aborts the whole call. Callers that need to branch on the
/// cause should match on the variant or compare [`RouterError::code`], which is
/// stable across releases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The hop sequence is malformed or misses a required native endpoint.
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),

    /// An input or output amount of zero was supplied.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// A pool has no reserves, or cannot release the requested amount.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Exact-input swap whose quoted output fell below the caller's minimum.
    #[error("insufficient output amount: quoted {amount_out}, minimum {amount_out_min}")]
    InsufficientOutputAmount {
        /// Output the pools would deliver.
        amount_out: U256,
        /// Minimum accepted by the caller.
        amount_out_min: U256,
    },

    /// Exact-output swap whose quoted input exceeds what the caller allows or attached.
    #[error("excessive input amount: required {amount_in}, maximum {amount_in_max}")]
    ExcessiveInputAmount {
        /// Input the pools require.
        amount_in: U256,
        /// Maximum accepted (or supplied) by the caller.
        amount_in_max: U256,
    },

    /// The call was submitted after its deadline.
    #[error("expired: deadline {deadline}, now {now}")]
    Expired {
        /// Caller supplied deadline, unix seconds.
        deadline: u64,
        /// Time the call was evaluated at, unix seconds.
        now: u64,
    },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("division by zero")]
    DivisionByZero,

    /// The reserve oracle knows no pool for this pair.
    #[error("pair not found: {token_a:?}/{token_b:?}")]
    PairNotFound {
        /// First token of the lookup.
        token_a: Address,
        /// Second token of the lookup.
        token_b: Address,
    },

    /// A pool's reserves moved between the quote and settlement.
    #[error("stale reserves for pair {pair:?}")]
    StaleReserves {
        /// Pool whose reserves no longer match the quote.
        pair: Address,
    },

    /// The transfer service rejected a balance movement.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Router construction parameters are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterError {
    /// Stable reason code for automated callers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            Self::InsufficientOutputAmount { .. } => "INSUFFICIENT_OUTPUT_AMOUNT",
            Self::ExcessiveInputAmount { .. } => "EXCESSIVE_INPUT_AMOUNT",
            Self::Expired { .. } => "EXPIRED",
            Self::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::PairNotFound { .. } => "PAIR_NOT_FOUND",
            Self::StaleReserves { .. } => "STALE_RESERVES",
            Self::TransferFailed(_) => "TRANSFER_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Whether the failure is a slippage guard (bound check) rather than a
    /// malformed request or an infrastructure fault.
    #[must_use]
    pub fn is_slippage(&self) -> bool {
        matches!(
            self,
            Self::InsufficientOutputAmount { .. } | Self::ExcessiveInputAmount { .. }
        )
    }
}
