//! Value objects for the order domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money amount with a fixed scale of two fractional digits.
///
/// Backed by [`Decimal`], so sums and products are exact. Serializes as a
/// decimal string, e.g. `"25.98"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Number of fractional digits every amount carries.
    pub const SCALE: u32 = 2;

    /// Largest amount a money column can hold (`NUMERIC(10,2)`).
    // 9_999_999_999 (scale 2) split into 96-bit parts; `Decimal::new` is not const.
    pub const MAX: Money = Money(Decimal::from_parts(1_410_065_407, 2, 0, false, 2));

    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::SCALE))
    }

    /// Creates a Money amount from a decimal with at most two fractional
    /// digits. Returns `None` if the value would need rounding.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let mut normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return None;
        }
        normalized.rescale(Self::SCALE);
        Some(Self(normalized))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::new(0, Self::SCALE))
    }

    /// Returns the amount as a decimal with scale two.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        let mut product = self.0 * Decimal::from(quantity);
        product.rescale(Self::SCALE);
        Money(product)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        let mut sum = self.0 + rhs.0;
        sum.rescale(Self::SCALE);
        Money(sum)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
