// Number handling shared by the engine's selector, its CSV provider and any
// presentation layer that renders scan results.
use crate::models::{CellValue, Market};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Parses decimals like "1,234,567" or "123.45" into f64.
/// Thousands separators and surrounding whitespace are ignored.
pub fn parse_decimal(s: &str) -> Result<f64> {
    let normalized: String = s.trim().chars().filter(|c| *c != ',').collect();

    let value = f64::from_str(&normalized)
        .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
    if !value.is_finite() {
        return Err(anyhow!("Failed to parse decimal '{}': not a finite number", s));
    }
    Ok(value)
}

/// Coerces a listing cell to a number. Blank, non-numeric and non-finite
/// cells yield `None`.
pub fn coerce_cell(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(v) if v.is_finite() => Some(*v),
        CellValue::Number(_) => None,
        CellValue::Text(s) => parse_decimal(s).ok(),
        CellValue::Empty => None,
    }
}

/// Renders a price in the market's currency: whole won for the Korean
/// exchanges ("12,345원"), dollars and cents for Nasdaq ("$123.45").
pub fn format_price(market: Market, price: f64) -> String {
    if market.is_domestic() {
        format!("{}원", group_thousands(price.round() as i64))
    } else {
        format!("${:.2}", price)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}
