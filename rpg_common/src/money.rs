use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------       Money         ---------------------------------------------------------
/// An amount of money in minor units (paise). All ledger amounts, order totals and tax components are stored as
/// whole paise, so "round to 2 decimal places" in the business rules means "round to a whole number of paise" here.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rupees = self.0 as f64 / 100.0;
        write!(f, "₹{rupees:0.2}")
    }
}

impl Money {
    pub fn from_paise(value: i64) -> Self {
        Self(value)
    }

    pub fn from_rupees(value: i64) -> Self {
        Self(value * 100)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Computes `self * num / den` with half-up rounding, using 128-bit intermediates so that realistic order
    /// totals cannot overflow. `den` must be non-zero.
    pub fn scale_div_half_up(&self, num: i64, den: i64) -> Self {
        let n = i128::from(self.0) * i128::from(num);
        let d = i128::from(den);
        let rounded = if (n >= 0) == (d > 0) { (n * 2 + d) / (d * 2) } else { (n * 2 - d) / (d * 2) };
        #[allow(clippy::cast_possible_truncation)]
        Self(rounded as i64)
    }

    /// Splits the amount into two halves that sum exactly to the original. The first half carries the rounding
    /// (half-up), i.e. `split_half_up(₹0.03) == (₹0.02, ₹0.01)`.
    pub fn split_half_up(&self) -> (Self, Self) {
        let first = self.scale_div_half_up(1, 2);
        (first, *self - first)
    }
}
