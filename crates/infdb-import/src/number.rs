//! Numeric parsing for spreadsheet cells.
//!
//! Counts in Korean spreadsheets are often written with unit suffixes:
//! `"3.1만"` is 31,000 and `"1.3천"` is 1,300. Arithmetic is done in
//! [`Decimal`] so `3.1 × 10,000` is exact before rounding.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

static UNIT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*(만|천)?$").expect("valid unit-number regex")
});

/// Parses a count such as `"31000"`, `"1,234"`, `"3.1만"` or `"1.3천"`.
///
/// Thousands separators are stripped, a `만` suffix multiplies by 10,000 and
/// `천` by 1,000, and the result is rounded to the nearest integer (halves
/// away from zero). Anything that does not fit that shape falls back to
/// [`parse_decimal`], so `"12 followers"` still yields 12.
///
/// Returns `None` when the string contains no leading number at all.
#[must_use]
pub fn parse_korean_number(raw: &str) -> Option<i64> {
    let cleaned = strip_separators(raw);

    let value = match UNIT_NUMBER.captures(&cleaned) {
        Some(caps) => {
            let base = Decimal::from_str(normalize_digits(&caps[1]).as_ref()).ok()?;
            let multiplier = match caps.get(2).map(|m| m.as_str()) {
                Some("만") => Decimal::from(10_000),
                Some("천") => Decimal::from(1_000),
                _ => Decimal::ONE,
            };
            base.checked_mul(multiplier)?
        }
        None => leading_decimal(&cleaned)?,
    };

    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Generic decimal parse: commas are stripped and the longest leading numeric
/// prefix is read, so `"5.2%"` yields 5.2 and `"abc"` yields `None`.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    leading_decimal(&strip_separators(raw))
}

fn strip_separators(raw: &str) -> String {
    raw.trim().chars().filter(|&c| c != ',').collect()
}

/// `"3."` and `".5"` are accepted by the pattern but not by `Decimal`.
fn normalize_digits(digits: &str) -> std::borrow::Cow<'_, str> {
    let trimmed = digits.strip_suffix('.').unwrap_or(digits);
    if trimmed.starts_with('.') {
        std::borrow::Cow::Owned(format!("0{trimmed}"))
    } else {
        std::borrow::Cow::Borrowed(trimmed)
    }
}

/// Reads an optional sign followed by digits with at most one decimal point
/// from the start of `s`. Requires at least one digit.
fn leading_decimal(s: &str) -> Option<Decimal> {
    let bytes = s.as_bytes();
    let mut end = 0usize;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let digits_start = end;
    let mut seen_dot = false;
    let mut seen_digit = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }

    let sign = &s[..digits_start];
    let digits = normalize_digits(&s[digits_start..end]);
    let literal = format!("{}{digits}", sign.trim_start_matches('+'));
    Decimal::from_str(&literal).ok()
}

#[cfg(test)]
#[path = "number_test.rs"]
mod tests;
