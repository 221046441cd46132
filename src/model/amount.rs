//! Amount type for handling monetary values in Dominican pesos.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are stored as JSON
//! numbers, parsed leniently from user input and displayed the way the `es-DO` locale displays
//! `DOP` currency, e.g. `RD$1,815.00`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// The currency symbol used for display.
pub const CURRENCY_SYMBOL: &str = "RD$";

/// Represents an amount of money.
///
/// Arithmetic is exact, so totals of amounts with at most two decimal places never drift.
///
/// # Examples
///
/// Parsing with the currency symbol and thousands separators:
/// ```
/// # use gastos_report::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("RD$1,115.00").unwrap();
/// assert_eq!(amount.to_string(), "RD$1,115.00");
/// ```
///
/// Blank input is zero:
/// ```
/// # use gastos_report::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("  ").unwrap();
/// assert!(amount.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount {
        value: Decimal::ZERO,
    };

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates an amount from a whole number of pesos.
    pub fn from_pesos(pesos: i64) -> Self {
        Self::new(Decimal::from(pesos))
    }

    /// Parses user input the way the expense form does: blank input is zero and so is anything
    /// that is not a number. Returns the amount and whether the input had to be discarded.
    pub fn coerce(s: &str) -> (Self, bool) {
        match Amount::from_str(s) {
            Ok(amount) => (amount, false),
            Err(_) => (Amount::ZERO, true),
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    /// The amount as a float, for consumers such as chart libraries that want one.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }

    fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Amount::ZERO;
        }
        Self::new(Decimal::from_f64(value).unwrap_or_default())
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Accept "RD$50", "-RD$50", "$50" and plain numbers
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let unsigned = unsigned
            .strip_prefix(CURRENCY_SYMBOL)
            .or_else(|| unsigned.strip_prefix('$'))
            .unwrap_or(unsigned);

        let without_commas = unsigned.replace(',', "");
        // Numbers written by spreadsheets or `JSON.stringify` may use an exponent, e.g. "1e3"
        let value = Decimal::from_str(&without_commas)
            .or_else(|e| {
                if without_commas.contains(['e', 'E']) {
                    Decimal::from_scientific(&without_commas)
                } else {
                    Err(e)
                }
            })
            .map_err(AmountError)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

/// Rounds to centavos, half away from zero, and groups the pesos by thousands. Works on the
/// decimal digits directly so that large amounts print exactly.
impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self
            .value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if !rounded.is_zero() && rounded.is_sign_negative() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (pesos, centavos) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        write!(
            f,
            "{sign}{CURRENCY_SYMBOL}{}.{centavos}",
            group_thousands(pesos)
        )
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value + rhs.value)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Whole amounts are written as integers so that stored documents look like the ones the
        // web form wrote, e.g. `"fuel": 1115`.
        if self.value.fract().is_zero() {
            if let Some(i) = self.value.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts numbers, numeric strings and `null`. Anything that is not a number is zero.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount::from_pesos(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Amount::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Amount::coerce(v).0)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Amount::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Amount::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Amount::ZERO)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
