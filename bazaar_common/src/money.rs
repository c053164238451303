use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

const MINOR_UNITS: i64 = 100;

//--------------------------------------       Money         ---------------------------------------------------------
/// An exact monetary amount, stored as an integer number of minor units (cents).
///
/// All catalog prices, order line prices and order totals use this type so that totals never drift the way binary
/// floating point would.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / MINOR_UNITS as u64;
        let cents = abs % MINOR_UNITS as u64;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

/// Parses a non-negative decimal string with at most two fractional digits, e.g. `"12"`, `"12.5"` or `"12.50"`.
///
/// No floating point arithmetic is involved.
impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        let is_digits = |v: &str| v.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(frac) {
            return Err(MoneyConversionError(format!("'{s}' is not a non-negative decimal amount")));
        }
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("'{s}' has more than two decimal places")));
        }
        let units = whole.parse::<i64>().map_err(|e| MoneyConversionError(format!("'{s}': {e}")))?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|e| MoneyConversionError(e.to_string()))? * 10,
            _ => frac.parse::<i64>().map_err(|e| MoneyConversionError(e.to_string()))?,
        };
        Money::from_units(units)
            .and_then(|v| v.checked_add(Money(cents)))
            .ok_or_else(|| MoneyConversionError(format!("'{s}' is too large")))
    }
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Money::from_units(10)` is ten dollars. Returns `None` on overflow.
    pub fn from_units(units: i64) -> Option<Self> {
        units.checked_mul(MINOR_UNITS).map(Self)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The line total for `qty` items at this price. Returns `None` on overflow.
    pub fn checked_mul(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Self)
    }

    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}
