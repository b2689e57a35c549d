//! Numeric field parsing utilities shared by every decoder
//!
//! This module provides helper functions for parsing optional numeric tokens,
//! rounding, unit conversion and sentinel detection. Everything here is pure
//! and never panics; absence is expressed as `None`.

use crate::constants::{INCH_TO_MM, INHG_TO_MBAR, KMH_TO_MS, MPH_TO_MS, PRESSURE_SENTINEL};
use crate::{Error, Result};

/// Parse an optional float token
///
/// Empty, unparsable and non-finite tokens yield `None`. When `reject_sentinel`
/// is set the pressure sentinel `999.9` also yields `None`.
pub fn parse_optional_float(token: &str, reject_sentinel: bool) -> Option<f64> {
    parse_float_field("value", token, reject_sentinel).ok()
}

/// Parse an optional integer token
pub fn parse_optional_int(token: &str) -> Option<i64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parse a float token, reporting which field failed
pub fn parse_float_field(field: &str, token: &str, reject_sentinel: bool) -> Result<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(Error::field(field, token));
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| Error::field(field, token))?;

    if !value.is_finite() || (reject_sentinel && is_sentinel(value)) {
        return Err(Error::field(field, token));
    }

    Ok(value)
}

/// Parse an integer token, reporting which field failed
pub fn parse_int_field(field: &str, token: &str) -> Result<i64> {
    parse_optional_int(token).ok_or_else(|| Error::field(field, token))
}

/// Whether a value is the pressure "no reading" sentinel
pub fn is_sentinel(value: f64) -> bool {
    value == PRESSURE_SENTINEL
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Multiply by a conversion factor
pub fn convert(value: f64, factor: f64) -> f64 {
    value * factor
}

/// Keep a value only if it satisfies the predicate
pub fn validate(value: Option<f64>, predicate: impl Fn(f64) -> bool) -> Option<f64> {
    value.filter(|v| predicate(*v))
}

/// km/h to m/s
pub fn kmh_to_ms(value: f64) -> f64 {
    convert(value, KMH_TO_MS)
}

/// mph to m/s, 2 decimal places
pub fn mph_to_ms(value: f64) -> f64 {
    round_to(convert(value, MPH_TO_MS), 2)
}

/// Fahrenheit to Celsius, rounded to the nearest degree
pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    ((value - 32.0) * 5.0 / 9.0).round()
}

/// Inches of mercury to millibar, rounded to the nearest millibar
pub fn inhg_to_mbar(value: f64) -> f64 {
    convert(value, INHG_TO_MBAR).round()
}

/// Inches to millimetres, 2 decimal places
pub fn inches_to_mm(value: f64) -> f64 {
    round_to(convert(value, INCH_TO_MM), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_float() {
        assert_eq!(parse_optional_float("12.5", false), Some(12.5));
        assert_eq!(parse_optional_float("  -3.25 ", false), Some(-3.25));
        assert_eq!(parse_optional_float("", false), None);
        assert_eq!(parse_optional_float("abc", false), None);
        assert_eq!(parse_optional_float("NaN", false), None);
        assert_eq!(parse_optional_float("inf", false), None);
    }

    #[test]
    fn test_sentinel_only_rejected_when_requested() {
        assert_eq!(parse_optional_float("999.9", true), None);
        assert_eq!(parse_optional_float("999.9", false), Some(999.9));
        assert_eq!(parse_optional_float("999.90", true), None);
        assert_eq!(parse_optional_float("1013.2", true), Some(1013.2));
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int("42"), Some(42));
        assert_eq!(parse_optional_int(" -7 "), Some(-7));
        assert_eq!(parse_optional_int("4.2"), None);
        assert_eq!(parse_optional_int(""), None);
    }

    #[test]
    fn test_parse_float_field_reports_field_name() {
        match parse_float_field("pressure", "x", true) {
            Err(Error::Field { field, token }) => {
                assert_eq!(field, "pressure");
                assert_eq!(token, "x");
            }
            other => panic!("Expected Field error, got {:?}", other),
        }
    }

    #[test]
    fn test_round_and_convert_chain() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-1.235, 1), -1.2);
        let speed = parse_optional_float("6.7", false).map(kmh_to_ms).map(|v| round_to(v, 2));
        assert!((speed.unwrap() - 6.7 / 3.6).abs() < 0.01);
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(Some(50.0), |v| (0.0..=100.0).contains(&v)), Some(50.0));
        assert_eq!(validate(Some(150.0), |v| (0.0..=100.0).contains(&v)), None);
        assert_eq!(validate(None, |_| true), None);
    }

    #[test]
    fn test_unit_helpers() {
        assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
        assert_eq!(fahrenheit_to_celsius(75.0), 24.0);
        assert_eq!(inhg_to_mbar(29.92), (29.92f64 * 33.86).round());
        assert!((mph_to_ms(10.0) - 4.4704).abs() < 0.01);
        assert_eq!(inches_to_mm(1.0), 25.4);
    }
}
