//! Swap orchestration for constant-product pools.
//!
//! This crate ties the pure math in `cp-router-domain` to the reserve and
//! transfer capabilities in `cp-router-protocols`:
//! - Multi-hop quoting with a single protocol fee on the final leg
//! - Six swap entry points with deadline and slippage checks
//! - Atomic settlement through a transfer plan
//! - Router configuration and a pluggable clock

/// Prelude module for convenient imports.
pub mod prelude;

/// Deadline time source.
pub mod clock;
/// Router configuration.
pub mod config;
/// Quote engine.
pub mod quote;
/// Swap variants and receipts.
pub mod receipt;
/// Swap orchestrator.
pub mod router;
