//! Ordered balance movements produced by one swap call.

use cp_router_domain::{Address, U256};
use serde::{Deserialize, Serialize};

/// A single balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStep {
    /// Token transfer between two accounts (pools included).
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Native to wrapped native, in place.
    WrapNative { account: Address, amount: U256 },
    /// Wrapped native to native, in place.
    UnwrapNative { account: Address, amount: U256 },
    /// Native asset transfer.
    TransferNative {
        from: Address,
        to: Address,
        amount: U256,
    },
}

/// Pool reserves a quote was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub pair: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub reserve_in: U256,
    pub reserve_out: U256,
}

/// Steps to settle, in execution order, plus the reserves they were priced
/// against. A settling ledger must reject the plan if any snapshot no longer
/// matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    steps: Vec<TransferStep>,
    snapshots: Vec<ReserveSnapshot>,
}

impl TransferPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step. Zero amount steps are dropped.
    pub fn push(&mut self, step: TransferStep) -> &mut Self {
        if !step.amount().is_zero() {
            self.steps.push(step);
        }
        self
    }

    /// Records the reserves of a pool the plan was priced against.
    pub fn expect_reserves(&mut self, snapshot: ReserveSnapshot) -> &mut Self {
        self.snapshots.push(snapshot);
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[TransferStep] {
        &self.steps
    }

    #[must_use]
    pub fn snapshots(&self) -> &[ReserveSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl TransferStep {
    #[must_use]
    pub fn amount(&self) -> U256 {
        match *self {
            Self::Transfer { amount, .. }
            | Self::WrapNative { amount, .. }
            | Self::UnwrapNative { amount, .. }
            | Self::TransferNative { amount, .. } => amount,
        }
    }
}
