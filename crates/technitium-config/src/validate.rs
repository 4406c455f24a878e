//! Value coercion helpers for the environment layer.

use crate::error::{ConfigError, ConfigResult};

const TRUE_WORDS: [&str; 4] = ["1", "true", "yes", "on"];
const FALSE_WORDS: [&str; 4] = ["0", "false", "no", "off"];

/// Parse a boolean flag, accepting `1/true/yes/on` and `0/false/no/off`
/// case-insensitively.
#[must_use]
pub fn coerce_bool(raw: &str) -> Option<bool> {
    let value = raw.trim().to_ascii_lowercase();
    if TRUE_WORDS.contains(&value.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parse a non-negative numeric value. Fractions are truncated; digit
/// grouping (`15_000`) is accepted. Non-finite and negative values are
/// rejected.
#[must_use]
pub fn coerce_number(raw: &str) -> Option<u64> {
    let cleaned = strip_digit_grouping(raw.trim());
    if let Ok(value) = cleaned.parse::<u64>() {
        return Some(value);
    }
    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value >= 18_446_744_073_709_551_615.0 {
        return None;
    }
    format!("{:.0}", value.trunc()).parse::<u64>().ok()
}

/// Validate a numeric field, producing a typed error for diagnostics.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a finite,
/// non-negative number.
pub fn parse_number_field(
    section: &'static str,
    field: &'static str,
    raw: &str,
) -> ConfigResult<u64> {
    coerce_number(raw).ok_or_else(|| ConfigError::InvalidField {
        section,
        field,
        value: raw.to_string(),
        reason: "must be a finite, non-negative number",
    })
}

/// Validate a boolean field, producing a typed error for diagnostics.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a recognised
/// boolean word.
pub fn parse_bool_field(
    section: &'static str,
    field: &'static str,
    raw: &str,
) -> ConfigResult<bool> {
    coerce_bool(raw).ok_or_else(|| ConfigError::InvalidField {
        section,
        field,
        value: raw.to_string(),
        reason: "must be one of 1/true/yes/on or 0/false/no/off",
    })
}

/// Remove `_` separators from a numeric literal. Non-numeric input is
/// returned unchanged.
#[must_use]
pub fn strip_digit_grouping(literal: &str) -> String {
    if is_grouped_number(literal) {
        literal.replace('_', "")
    } else {
        literal.to_string()
    }
}

fn is_grouped_number(literal: &str) -> bool {
    let digits = literal
        .strip_prefix(['+', '-'])
        .unwrap_or(literal);
    !digits.is_empty()
        && digits.starts_with(|ch: char| ch.is_ascii_digit())
        && digits.ends_with(|ch: char| ch.is_ascii_digit())
        && digits
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch == '_' || ch == '.')
}
