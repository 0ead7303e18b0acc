use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

// ============================================================================
// Money - Fixed-Precision Decimal Amount
// ============================================================================
//
// All monetary fields in the core use this type. Arithmetic is exact
// (backed by rust_decimal); rounding is a presentation concern and never
// happens here. Floating point is never used for money.
//
// ============================================================================

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Whole currency units, e.g. `Money::from_major(25)` is 25.00
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Minor units with two fractional digits, e.g. `from_minor(4320)` is 43.20
    pub fn from_minor(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiply by an integer quantity
    pub fn times(&self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Divide by an integer; `None` when dividing by zero
    pub fn div_int(&self, divisor: i64) -> Option<Self> {
        self.0.checked_div(Decimal::from(divisor)).map(Self)
    }

    /// `self × rate ÷ 100`, the only division the tax rules perform
    pub fn percent(&self, rate: Decimal) -> Self {
        Self(self.0 * rate / HUNDRED)
    }

    // ------------------------------------------------------------------------
    // Checked arithmetic: `None` when the result leaves the Decimal range
    // ------------------------------------------------------------------------

    pub fn checked_add(&self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(&self, rhs: Money) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_times(&self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    pub fn checked_percent(&self, rate: Decimal) -> Option<Self> {
        self.0.checked_mul(rate)?.checked_div(HUNDRED).map(Self)
    }

    /// Sum that stops at the first overflow
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }

    /// `self × 100 ÷ base`, e.g. a margin as a percentage of price
    pub fn percent_of(&self, base: Money) -> Option<Decimal> {
        self.0.checked_mul(HUNDRED)?.checked_div(base.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Operators
// ============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        self.times(rhs)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money(self.0 * rhs)
    }
}

impl Mul<Money> for Money {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money(self.0 * rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_addition() {
        let a = Money::new(dec!(0.1));
        let b = Money::new(dec!(0.2));
        assert_eq!(a + b, Money::new(dec!(0.3)));
    }

    #[test]
    fn test_equality_ignores_scale() {
        assert_eq!(Money::new(dec!(43.2)), Money::new(dec!(43.20)));
        assert_eq!(Money::from_minor(4320), Money::new(dec!(43.2)));
    }

    #[test]
    fn test_percent() {
        let base = Money::from_major(40);
        assert_eq!(base.percent(dec!(8)), Money::new(dec!(3.20)));
        assert_eq!(base.percent(Decimal::ZERO), Money::ZERO);
    }

    #[test]
    fn test_percent_of() {
        let profit = Money::from_major(25);
        assert_eq!(profit.percent_of(Money::from_major(100)), Some(dec!(25)));
        assert_eq!(profit.percent_of(Money::ZERO), None);
    }

    #[test]
    fn test_div_int_by_zero() {
        assert_eq!(Money::from_major(10).div_int(0), None);
        assert_eq!(Money::from_major(10).div_int(4), Some(Money::new(dec!(2.5))));
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Money::new(dec!(25.00));
        assert_eq!(unit.times(2), Money::from_major(50));
        let total: Money = vec![unit, unit, Money::from_major(50)].into_iter().sum();
        assert_eq!(total, Money::from_major(100));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(Money::from_major(1)), None);
        assert_eq!(max.checked_times(2), None);
        assert_eq!(max.checked_percent(dec!(200)), None);
        assert_eq!(Money::new(Decimal::MIN).checked_sub(Money::from_major(1)), None);
        assert_eq!(Money::checked_sum([max, max]), None);

        assert_eq!(Money::from_major(40).checked_percent(dec!(8)), Some(Money::new(dec!(3.20))));
        assert_eq!(
            Money::checked_sum([Money::from_major(1), Money::from_major(2)]),
            Some(Money::from_major(3))
        );
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(Money::new(dec!(0.01)).is_positive());
    }

    #[test]
    fn test_serialization_as_string() {
        let m = Money::new(dec!(112.60));
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"112.60\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_parse() {
        assert_eq!("53.20".parse::<Money>().unwrap(), Money::new(dec!(53.2)));
        assert!("abc".parse::<Money>().is_err());
    }
}
