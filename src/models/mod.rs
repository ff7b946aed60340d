//! CSV row layouts and their conversions to and from the domain types.
//!
//! Money is stored in cents in the domain and written as dollars with two
//! decimals; dates use the `MM/DD/YYYY` format of the source reports.

use chrono::NaiveDate;
use thiserror::Error;

pub mod customer;
pub mod order;
pub mod product;

/// Date format used by every CSV file.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Result type returned by the row conversion helpers.
pub type RowResult<T> = Result<T, RowError>;

/// Errors raised while converting a CSV row into a domain record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("`{field}` is required")]
    MissingField { field: &'static str },
    #[error("`{field}` has invalid amount `{value}`")]
    InvalidAmount { field: &'static str, value: String },
    #[error("`{field}` has invalid date `{value}`")]
    InvalidDate { field: &'static str, value: String },
    #[error("`{field}` has invalid flag `{value}`")]
    InvalidFlag { field: &'static str, value: String },
    #[error(transparent)]
    InvalidStatus(#[from] crate::domain::order::UnknownOrderStatus),
    /// Rows sharing an order number disagree on order-level columns.
    #[error("order `{number}` has conflicting rows")]
    ConflictingOrderRows { number: String },
}

/// Render cents as a dollar amount with two decimals, e.g. `-1.05`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parse a dollar amount with at most two decimals into cents.
pub fn parse_cents(field: &'static str, value: &str) -> RowResult<i64> {
    let invalid = || RowError::InvalidAmount {
        field,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > 2
        || !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(fraction))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

/// Parse an optional amount, treating an empty cell as absent.
pub fn parse_optional_cents(field: &'static str, value: &str) -> RowResult<Option<i64>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_cents(field, value).map(Some)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(field: &'static str, value: &str) -> RowResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RowError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

pub fn parse_optional_date(field: &'static str, value: &str) -> RowResult<Option<NaiveDate>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(field, value).map(Some)
    }
}

/// Render a boolean using the two labels of the column, e.g. `Yes`/`No`.
pub fn format_flag(value: bool, yes: &str, no: &str) -> String {
    let label = if value { yes } else { no };
    label.to_string()
}

/// Parse a two-label flag, case-insensitively.
pub fn parse_flag(field: &'static str, value: &str, yes: &str, no: &str) -> RowResult<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(yes) {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case(no) {
        Ok(false)
    } else {
        Err(RowError::InvalidFlag {
            field,
            value: value.to_string(),
        })
    }
}

/// Treat an empty cell as `None`.
pub fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn required(field: &'static str, value: String) -> RowResult<String> {
    non_empty(value).ok_or(RowError::MissingField { field })
}
