use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Number of fractional digits every ledger amount is held at.
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// Rounds to the money scale. Use [`Money::exact`] when extra precision
    /// must be rejected instead.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(MONEY_SCALE))
    }

    /// Returns `None` if `decimal` carries more fractional digits than the money scale.
    pub fn exact(decimal: Decimal) -> Option<Self> {
        if decimal.normalize().scale() > MONEY_SCALE {
            return None;
        }
        let mut value = decimal;
        value.rescale(MONEY_SCALE);
        Some(Money(value))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs_diff(self, other: Money) -> Money {
        Money((self.0 - other.0).abs())
    }

    pub fn to_cents(self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).to_i64()
    }

    /// `round(amount / width)` with midpoints going to the even key.
    /// `None` when `width` is not positive or the key overflows `i64`.
    pub fn bucket_key(self, width: Decimal) -> Option<i64> {
        if width <= Decimal::ZERO {
            return None;
        }
        self.0.checked_div(width)?.round().to_i64()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}
