//! Validation of raw latitude/longitude fields.
//!
//! Textual coordinates are read the way browsers read them with
//! `parseFloat`: leading whitespace is skipped and the longest numeric
//! prefix wins, so `"50.45 N"` is `50.45` while `"N 50.45"` is unusable.

use std::sync::LazyLock;

use regex::Regex;
use services_map_location_models::RawCoordinate;

/// Placeholder some clients store when the coordinate was never set.
const UNDEFINED_LITERAL: &str = "undefined";

/// Longest numeric prefix accepted by `parseFloat`.
static NUMERIC_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("valid regex")
});

/// Parses a raw coordinate into a finite number.
///
/// Returns `None` for missing values, the literal `"undefined"`, text with
/// no numeric prefix, non-finite numbers, and non-scalar JSON values.
#[must_use]
pub fn parse_coordinate(value: Option<&RawCoordinate>) -> Option<f64> {
    let parsed = match value? {
        RawCoordinate::Number(n) => *n,
        RawCoordinate::Text(text) => {
            if text == UNDEFINED_LITERAL {
                return None;
            }
            parse_float_prefix(text)?
        }
        RawCoordinate::Other(_) => return None,
    };

    parsed.is_finite().then_some(parsed)
}

/// Whether a raw coordinate is usable.
#[must_use]
pub fn is_valid_coordinate(value: Option<&RawCoordinate>) -> bool {
    parse_coordinate(value).is_some()
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let prefix = NUMERIC_PREFIX_RE.find(trimmed)?;
    prefix.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCoordinate {
        RawCoordinate::Text(s.to_string())
    }

    #[test]
    fn accepts_numbers_and_numeric_text() {
        assert_eq!(parse_coordinate(Some(&RawCoordinate::Number(30.52))), Some(30.52));
        assert_eq!(parse_coordinate(Some(&text("50.45"))), Some(50.45));
        assert_eq!(parse_coordinate(Some(&text("-0.5"))), Some(-0.5));
        assert_eq!(parse_coordinate(Some(&text("+12"))), Some(12.0));
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        assert!(is_valid_coordinate(Some(&RawCoordinate::Number(0.0))));
        assert!(is_valid_coordinate(Some(&text("0"))));
    }

    #[test]
    fn rejects_missing_and_undefined() {
        assert!(!is_valid_coordinate(None));
        assert!(!is_valid_coordinate(Some(&text("undefined"))));
        assert!(!is_valid_coordinate(Some(&text(""))));
        assert!(!is_valid_coordinate(Some(&text("   "))));
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(!is_valid_coordinate(Some(&text("abc"))));
        assert!(!is_valid_coordinate(Some(&text("N 50.45"))));
        assert!(!is_valid_coordinate(Some(&text("null"))));
        assert!(!is_valid_coordinate(Some(&text("-"))));
    }

    #[test]
    fn reads_leading_numeric_prefix() {
        assert_eq!(parse_coordinate(Some(&text("  50.45 N"))), Some(50.45));
        assert_eq!(parse_coordinate(Some(&text("30.5abc"))), Some(30.5));
        assert_eq!(parse_coordinate(Some(&text(".25"))), Some(0.25));
        assert_eq!(parse_coordinate(Some(&text("7."))), Some(7.0));
        assert_eq!(parse_coordinate(Some(&text("1e1"))), Some(10.0));
        assert_eq!(parse_coordinate(Some(&text("3e"))), Some(3.0));
        assert_eq!(parse_coordinate(Some(&text("1.2.3"))), Some(1.2));
    }

    #[test]
    fn rejects_other_json_shapes() {
        assert!(!is_valid_coordinate(Some(&RawCoordinate::Other(
            serde_json::Value::Bool(true)
        ))));
        assert!(!is_valid_coordinate(Some(&RawCoordinate::Other(
            serde_json::json!({ "lat": 50.45 })
        ))));
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(!is_valid_coordinate(Some(&text("Infinity"))));
        assert!(!is_valid_coordinate(Some(&text("-Infinity"))));
        assert!(!is_valid_coordinate(Some(&RawCoordinate::Number(f64::NAN))));
        assert!(!is_valid_coordinate(Some(&RawCoordinate::Number(f64::INFINITY))));
    }
}
