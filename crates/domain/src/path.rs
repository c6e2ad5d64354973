//! Hop sequence validation.
//!
//! Runs before any reserve lookup: a path that fails here never reaches the
//! reserve oracle.

use crate::address::Address;
use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};

/// Which path endpoint, if any, must be the wrapped native asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeEndpoint {
    /// Token to token; neither endpoint is constrained.
    None,
    /// Native asset in: `path[0]` must be the wrapped native token.
    First,
    /// Native asset out: `path[last]` must be the wrapped native token.
    Last,
}

/// Checks a path against the structural rules and the native endpoint
/// constraint of the calling swap variant.
pub fn validate_path(
    path: &[Address],
    require_native_at: NativeEndpoint,
    wrapped_native: Address,
) -> RouterResult<()> {
    validate_shape(path)?;

    match require_native_at {
        NativeEndpoint::None => {}
        NativeEndpoint::First => {
            if path[0] != wrapped_native {
                return Err(RouterError::InvalidPath(
                    "path must start with the wrapped native token",
                ));
            }
        }
        NativeEndpoint::Last => {
            if path[path.len() - 1] != wrapped_native {
                return Err(RouterError::InvalidPath(
                    "path must end with the wrapped native token",
                ));
            }
        }
    }

    Ok(())
}

/// Structural rules only: at least two tokens, no zero address, no
/// identical adjacent tokens.
pub fn validate_shape(path: &[Address]) -> RouterResult<()> {
    if path.len() < 2 {
        return Err(RouterError::InvalidPath("path needs at least two tokens"));
    }
    if path.iter().any(Address::is_zero) {
        return Err(RouterError::InvalidPath("zero address in path"));
    }
    if path.windows(2).any(|hop| hop[0] == hop[1]) {
        return Err(RouterError::InvalidPath("identical adjacent tokens"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_structural_rules() {
        let weth = addr(0xee);
        assert!(validate_path(&[addr(1), addr(2)], NativeEndpoint::None, weth).is_ok());
        assert!(validate_path(&[addr(1), addr(2), addr(1)], NativeEndpoint::None, weth).is_ok());

        for path in [
            vec![],
            vec![addr(1)],
            vec![addr(1), addr(1)],
            vec![addr(1), Address::zero()],
            vec![Address::zero(), addr(1)],
        ] {
            assert!(matches!(
                validate_path(&path, NativeEndpoint::None, weth),
                Err(RouterError::InvalidPath(_))
            ));
        }
    }

    #[test]
    fn test_native_endpoints() {
        let weth = addr(0xee);
        let uni = addr(0x1f);

        assert!(validate_path(&[weth, uni], NativeEndpoint::First, weth).is_ok());
        assert!(validate_path(&[uni, weth], NativeEndpoint::Last, weth).is_ok());

        assert!(matches!(
            validate_path(&[uni, weth], NativeEndpoint::First, weth),
            Err(RouterError::InvalidPath(_))
        ));
        assert!(matches!(
            validate_path(&[weth, uni], NativeEndpoint::Last, weth),
            Err(RouterError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_zero_address_endpoint_is_invalid_for_native_variants() {
        let weth = addr(0xee);
        let uni = addr(0x1f);

        assert!(matches!(
            validate_path(&[Address::zero(), uni], NativeEndpoint::First, weth),
            Err(RouterError::InvalidPath(_))
        ));
        assert!(matches!(
            validate_path(&[uni, Address::zero()], NativeEndpoint::Last, weth),
            Err(RouterError::InvalidPath(_))
        ));
    }
}
