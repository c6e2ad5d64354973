//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use cp_router_execution::prelude::*;
//! ```

// Clock
pub use crate::clock::{Clock, FixedClock, SystemClock};

// Config
pub use crate::config::RouterConfig;

// Quote
pub use crate::quote::{QuoteEngine, SwapQuote};

// Receipt
pub use crate::receipt::{SwapReceipt, SwapVariant};

// Router
pub use crate::router::{SwapRequest, SwapRouter};
