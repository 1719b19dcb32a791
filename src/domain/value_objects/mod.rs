//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Money value object, in whole rupees.
///
/// Catalog prices carry no paise, so a plain integer is enough and totals
/// stay exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(amount: i64) -> Self { Self(amount) }
    pub const fn amount(&self) -> i64 { self.0 }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0.saturating_mul(i64::from(qty))) }

    /// Formats with the rupee sign and Indian digit grouping, e.g. `₹1,00,000`.
    pub fn display(&self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}₹{}", group_en_in(&digits))
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, other: Money) -> Money { Money(self.0.saturating_add(other.0)) }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money { iter.fold(Money::ZERO, Add::add) }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self { Self(amount) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.display()) }
}

/// Last three digits, then groups of two: 1234567 -> 12,34,567.
fn group_en_in(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Percentage saved against the MRP, rounded to the nearest whole percent.
pub fn calc_discount(price: Money, mrp: Money) -> i64 {
    if mrp.amount() <= 0 {
        return 0;
    }
    let saved = (mrp.amount() - price.amount()) as f64;
    (saved / mrp.amount() as f64 * 100.0).round() as i64
}

/// Formats a bare amount the way product cards and order history show it.
pub fn format_price(amount: i64) -> String { Money::new(amount).display() }

/// Builds a `validator` error carrying the message shown next to the field.
pub(crate) fn field_error(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty or whitespace-only input.
pub(crate) fn require_text(value: &str, message: &'static str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() { Err(field_error("required", message)) } else { Ok(()) }
}

/// Accepts exactly `len` ASCII digits.
pub(crate) fn require_digits(value: &str, len: usize, message: &'static str) -> Result<(), validator::ValidationError> {
    if value.len() == len && value.bytes().all(|b| b.is_ascii_digit()) { Ok(()) } else { Err(field_error("digits", message)) }
}
