//! Fixed-point price and size utilities.
//!
//! All prices and sizes are `u64` scaled by 10^8, giving 8 decimal places
//! without floating-point error. Conversions from user text go through
//! `rust_decimal`.
//!
//! ```
//! use matchbook::types::price::{to_fixed, from_fixed};
//!
//! let price = to_fixed("50000.12345678").unwrap();
//! assert_eq!(price, 5_000_012_345_678);
//! assert_eq!(from_fixed(price), "50000.12345678");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
pub const SCALE: u64 = 100_000_000;

/// Number of decimal places carried by [`SCALE`].
pub const DECIMALS: u32 = 8;

/// Convert a decimal string to fixed-point.
///
/// Returns `None` for unparsable, negative, out-of-range input, or input
/// with more than 8 decimal places (sub-tick amounts are not rounded).
///
/// ```
/// use matchbook::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("0.000000001"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a `Decimal` to fixed-point; see [`to_fixed`].
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() || d.normalize().scale() > DECIMALS {
        return None;
    }
    d.checked_mul(Decimal::from(SCALE))?.to_u64()
}

/// Convert fixed-point to a `Decimal`.
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Render fixed-point with all 8 decimal places.
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Render fixed-point with trailing zeros trimmed.
///
/// ```
/// use matchbook::types::price::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(100_000_000), "1");
/// assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    fixed_to_decimal(value).normalize().to_string()
}

// ============================================================================
// Unit Tests
// ============================================================================
