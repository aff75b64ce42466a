use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Amount in minor units (cents).
///
/// Recorded amounts live in `0..=Money::MAX_RECORD`. Derived values such as
/// the remaining budget of an overspent category go negative. Arithmetic
/// saturates at the `i64` bounds.
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::new(12_34).to_string(), "12.34");
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount a single record may carry (10^13 units).
    pub const MAX_RECORD: Money = Money(1_000_000_000_000_000);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Multiplies by `numerator / denominator`, rounding half away from zero
    /// to the nearest minor unit.
    ///
    /// A zero `denominator` yields [`Money::ZERO`].
    ///
    /// ```rust
    /// use engine::Money;
    ///
    /// // 1000.00 paid every two weeks is 2166.67 a month.
    /// assert_eq!(Money::new(100_000).scale(26, 12), Money::new(216_667));
    /// ```
    #[must_use]
    pub fn scale(self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::ZERO;
        }
        let value = i128::from(self.0) * i128::from(numerator);
        let denominator = i128::from(denominator);
        let quotient = value / denominator;
        let remainder = value % denominator;
        let rounded = if remainder.abs() * 2 >= denominator.abs() {
            if (value < 0) != (denominator < 0) {
                quotient - 1
            } else {
                quotient + 1
            }
        } else {
            quotient
        };
        Money(rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    #[must_use]
    pub fn percent(self, percent: u8) -> Money {
        self.scale(i64::from(percent), 100)
    }

    /// `self / whole * 100`, or `0.0` when `whole` is not positive.
    #[must_use]
    pub fn ratio_percent(self, whole: Money) -> f64 {
        if whole.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 * 100.0 / whole.0 as f64
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// `"1500"`, `"1500.5"` or `"1500,50"`, with an optional sign. At most two
    /// decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn scale_rounds_half_away_from_zero() {
        assert_eq!(Money::new(100_000).scale(26, 12), Money::new(216_667));
        assert_eq!(Money::new(120_000).scale(1, 12), Money::new(10_000));
        assert_eq!(Money::new(5).scale(1, 2), Money::new(3));
        assert_eq!(Money::new(-5).scale(1, 2), Money::new(-3));
        assert_eq!(Money::new(100).scale(1, 0), Money::ZERO);
    }

    #[test]
    fn arithmetic_saturates() {
        let mut total = Money::MAX_RECORD;
        for _ in 0..10_000 {
            total += Money::MAX_RECORD;
        }
        assert_eq!(total, Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MIN) - Money::new(1), Money::new(i64::MIN));
    }

    #[test]
    fn ratio_percent_guards_zero() {
        assert_eq!(Money::new(600_000).ratio_percent(Money::new(1_250_000)), 48.0);
        assert_eq!(Money::new(100).ratio_percent(Money::ZERO), 0.0);
    }
}
