//! Core domain of the constant-product router.
//!
//! This crate is pure and synchronous:
//! - Addresses and token metadata
//! - Fixed-point math with a 512-bit intermediate
//! - Constant-product single hop formulas
//! - Protocol fee configuration
//! - Path validation
//! - The error taxonomy shared by every router crate

/// Account and token identifiers.
pub mod address;
/// Error taxonomy.
pub mod error;
/// Protocol fee.
pub mod fees;
/// Quote arithmetic.
pub mod math;
/// Path validation.
pub mod path;
/// Token metadata and unit conversion.
pub mod token;

pub use address::{Address, format_address, parse_address};
pub use error::{RouterError, RouterResult};
pub use fees::{BPS_DENOMINATOR, ProtocolFee};
pub use path::{NativeEndpoint, validate_path, validate_shape};
pub use primitive_types::U256;
pub use token::Token;
