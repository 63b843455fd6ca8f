//! Precision-safe money type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic so currency conversion
//! and cent rounding never go through floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Monetary amount with exact decimal precision.
///
/// The currency is implied by context: marketplace listings are quoted in
/// the upstream's native currency (CNY), everything shown to users is USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round half-away-from-zero to whole cents.
    #[inline]
    pub fn round_cents(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Ratio `self / other`, or None when `other` is zero or the quotient
    /// overflows.
    ///
    /// Used to derive an FX rate from the same reference price quoted in
    /// two currencies.
    #[inline]
    pub fn ratio_to(&self, other: Price) -> Option<Decimal> {
        self.0.checked_div(other.0)
    }

    /// `self * factor`, or None on overflow.
    #[inline]
    pub fn checked_mul(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Format as a USD amount with two decimals, e.g. `$12.34`.
    pub fn to_usd_string(&self) -> String {
        format!("${:.2}", self.round_cents().0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
