//! # Money Module
//!
//! Provides the `Money` type for prices, line amounts and header totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64:                                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Prices live in NUMERIC columns. Decoding them into f64 loses          │
//! │  precision and sqlx refuses the conversion anyway.                     │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    NUMERIC(12,2) ⇄ Decimal ⇄ JSON number                               │
//! │    700.00 × 2 = 1400.00 exactly                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use backoffice_core::money::Money;
//!
//! let price = Money::from_units(700);
//! let amount = price.checked_times(2);
//! assert_eq!(amount, Some(Money::from_units(1400)));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value stored as an exact decimal.
///
/// ## Wire Format
/// Serialized as a plain JSON number (`700`, `12.5`), so clients that
/// already send numbers keep working. Deserialization accepts integers,
/// floats and numeric strings.
///
/// ## Overflow
/// Amounts arrive from request bodies, so arithmetic is checked and
/// returns `None` past the decimal range instead of panicking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(Decimal);

impl Money {
    /// Zero amount. Used as the starting point for header totals.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a whole-unit amount.
    ///
    /// ```rust
    /// use backoffice_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(50).to_string(), "50");
    /// ```
    #[inline]
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Creates an amount from an integer mantissa and a decimal scale.
    ///
    /// `Money::from_scaled(1250, 2)` is `12.50`.
    #[inline]
    pub fn from_scaled(mantissa: i64, scale: u32) -> Self {
        Money(Decimal::new(mantissa, scale))
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// This is the line amount rule for supplier orders, where the store
    /// keeps only the purchase price and quantity.
    #[inline]
    pub fn checked_times(self, quantity: i32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Sums amounts, `None` if any partial sum overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_quantity() {
        assert_eq!(
            Money::from_units(50).checked_times(3),
            Some(Money::from_units(150))
        );
        assert_eq!(
            Money::from_scaled(1250, 2).checked_times(4),
            Some(Money::from_units(50))
        );
        assert_eq!(Money::from_units(9).checked_times(0), Some(Money::ZERO));
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_units(1400), Money::from_scaled(5, 1)];
        assert_eq!(Money::checked_sum(lines), Some(Money::from_scaled(14005, 1)));
        assert_eq!(Money::checked_sum([]), Some(Money::ZERO));
    }

    #[test]
    fn test_overflow_is_none() {
        let huge: Money = serde_json::from_str("50000000000000000000000000000").unwrap();

        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(Money::checked_sum([huge, huge, Money::from_units(1)]), None);
        assert_eq!(huge.checked_times(1), Some(huge));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_units(700)).unwrap();
        assert_eq!(json, "700.0");

        let parsed: Money = serde_json::from_str("700").unwrap();
        assert_eq!(parsed, Money::from_units(700));

        let parsed: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(parsed, Money::from_scaled(125, 1));
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(Money::from_scaled(140000, 2).to_string(), "1400");
        assert_eq!(Money::from_scaled(1250, 2).to_string(), "12.5");
    }
}
