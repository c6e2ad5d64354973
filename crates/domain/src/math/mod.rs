//! Integer arithmetic for quoting. No floating point is used in settlement.

pub mod constant_product;
pub mod fixed_point;
