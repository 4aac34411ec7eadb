// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::FieldErrors;

pub const DEFAULT_CURRENCY: &str = "NGN";

/// Column precision shared by every money field: 15 digits, 2 after the point.
const MONEY_SCALE: u32 = 2;
const MONEY_INTEGER_DIGITS: usize = 13;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// `part / whole * 100` rounded to two places; zero when `whole` is zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

/// Upper-cases and checks an ISO-4217 style code, recording a field error
/// when it is malformed.
pub fn normalize_currency(errors: &mut FieldErrors, field: &str, raw: &str) -> String {
    let ccy = raw.trim().to_uppercase();
    if !CURRENCY_RE.is_match(&ccy) {
        errors.push(field, format!("'{}' is not a three-letter currency code", raw));
    }
    ccy
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn check_money(errors: &mut FieldErrors, field: &str, amount: &Decimal) {
    if amount.scale() > MONEY_SCALE && amount.round_dp(MONEY_SCALE) != *amount {
        errors.push(field, "Ensure that there are no more than 2 decimal places.");
    }
    let integer_digits = amount.trunc().abs().to_string().trim_start_matches('0').len();
    if integer_digits > MONEY_INTEGER_DIGITS {
        errors.push(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                MONEY_INTEGER_DIGITS
            ),
        );
    }
}

/// Normalizes a money value to two decimal places for storage.
pub fn money(amount: Decimal) -> Decimal {
    let mut d = amount.round_dp(MONEY_SCALE);
    d.rescale(MONEY_SCALE);
    d
}

pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize, required: bool) {
    if required && value.trim().is_empty() {
        errors.push(field, "This field may not be blank.");
    }
    if value.chars().count() > max_len {
        errors.push(
            field,
            format!("Ensure this field has no more than {} characters.", max_len),
        );
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
