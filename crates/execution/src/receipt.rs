//! Swap variants and the receipt returned by a settled swap.

use cp_router_domain::{Address, NativeEndpoint, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The six router entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapVariant {
    ExactTokensForTokens,
    TokensForExactTokens,
    ExactNativeForTokens,
    TokensForExactNative,
    ExactTokensForNative,
    NativeForExactTokens,
}

impl SwapVariant {
    pub const ALL: [SwapVariant; 6] = [
        Self::ExactTokensForTokens,
        Self::TokensForExactTokens,
        Self::ExactNativeForTokens,
        Self::TokensForExactNative,
        Self::ExactTokensForNative,
        Self::NativeForExactTokens,
    ];

    /// Whether the caller fixes the input (and bounds the output).
    #[must_use]
    pub fn is_exact_input(self) -> bool {
        matches!(
            self,
            Self::ExactTokensForTokens | Self::ExactNativeForTokens | Self::ExactTokensForNative
        )
    }

    #[must_use]
    pub fn native_in(self) -> bool {
        matches!(self, Self::ExactNativeForTokens | Self::NativeForExactTokens)
    }

    #[must_use]
    pub fn native_out(self) -> bool {
        matches!(self, Self::TokensForExactNative | Self::ExactTokensForNative)
    }

    /// Path endpoint that must be the wrapped native token.
    #[must_use]
    pub fn native_endpoint(self) -> NativeEndpoint {
        if self.native_in() {
            NativeEndpoint::First
        } else if self.native_out() {
            NativeEndpoint::Last
        } else {
            NativeEndpoint::None
        }
    }

    /// Snake case name, as accepted by [`FromStr`](std::str::FromStr).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ExactTokensForTokens => "exact_tokens_for_tokens",
            Self::TokensForExactTokens => "tokens_for_exact_tokens",
            Self::ExactNativeForTokens => "exact_native_for_tokens",
            Self::TokensForExactNative => "tokens_for_exact_native",
            Self::ExactTokensForNative => "exact_tokens_for_native",
            Self::NativeForExactTokens => "native_for_exact_tokens",
        }
    }
}

impl fmt::Display for SwapVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SwapVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown swap variant: {s}"))
    }
}

/// Outcome of a settled swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    /// Correlates the receipt with the call's log lines.
    pub id: Uuid,
    pub variant: SwapVariant,
    pub caller: Address,
    pub to: Address,
    /// Per-token amounts along the path; the last is what `to` received.
    pub amounts: Vec<U256>,
    pub protocol_fee: U256,
    pub fee_recipient: Address,
    /// Native value returned to the caller (native-in exact-output only).
    pub refund: U256,
    /// Unix seconds the call was evaluated at.
    pub executed_at: u64,
}

impl SwapReceipt {
    #[must_use]
    pub fn amount_in(&self) -> U256 {
        self.amounts.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn amount_out(&self) -> U256 {
        self.amounts.last().copied().unwrap_or_default()
    }
}
