//! Raw cell values and the total parse helpers used by transforms

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One file row as parsed: original column header to raw cell value.
/// Never mutated after parsing; downstream stages derive fresh rows.
pub type RawRow = HashMap<String, CellValue>;

/// One row after mapping: canonical target field to coerced cell value
pub type TransformedRow = HashMap<String, CellValue>;

/// A single cell as read from an uploaded file
///
/// Serializes untagged, so records cross the wire as plain JSON values
/// (`Empty` becomes `null`). Variant order matters for deserialization:
/// untagged enums try variants top to bottom, and `Text` would swallow
/// numeric strings if it came before `Number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
    Empty,
}

impl CellValue {
    /// Build a text cell, collapsing the empty string to `Empty`
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    /// True when the cell has no usable content
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// Stringified form used by validation checks and CSV export
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// Parse an amount-like string into a Decimal
///
/// Handles currency symbols, thousands separators, and the accounting
/// parentheses notation for negatives: `(100.00)` -> -100.00.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();

    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;

    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}

/// Parse a date string, trying the formats third-party exports use
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%d.%m.%Y",
    ];

    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Datetime forms produced by spreadsheet cells
    let datetime_formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Convert a spreadsheet serial day number into a date
///
/// Serial day numbers count from the 1900 date system epoch of 1899-12-30.
pub fn date_from_serial(serial: Decimal) -> Option<NaiveDate> {
    let days = serial.trunc().to_i64()?;

    // 2958465 is 9999-12-31 in the 1900 date system
    if days <= 0 || days > 2_958_465 {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(days as u64))
}
