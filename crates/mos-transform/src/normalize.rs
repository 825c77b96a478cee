//! Cell normalization.
//!
//! Every raw cell maps to exactly one canonical string; the empty string is the
//! canonical "no value" marker. Normalization is total and idempotent.

use mos_model::Cell;
use mos_policy::Settings;

/// Canonical text of a raw cell.
pub fn normalize(cell: &Cell, settings: &Settings) -> String {
    let text = match cell {
        Cell::Empty => return String::new(),
        Cell::Text(value) => collapse_integral(&collapse_whitespace(value)),
        Cell::Number(value) => format_number(*value),
        Cell::Int(value) => value.to_string(),
        Cell::Bool(value) => format_bool(*value, settings.lowercase_booleans),
    };
    if settings.is_empty_token(&text) {
        String::new()
    } else {
        text
    }
}

/// Normalize text that did not come from a typed cell (CSV input, header text).
pub fn normalize_str(value: &str, settings: &Settings) -> String {
    if value.is_empty() {
        return String::new();
    }
    normalize(&Cell::Text(value.to_string()), settings)
}

/// Collapse runs of whitespace (spaces, tabs, newlines) into one space and trim.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Integral floats print as integers; `-0.0` prints as `0`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn format_bool(value: bool, lowercase: bool) -> String {
    match (value, lowercase) {
        (true, true) => "true".to_string(),
        (false, true) => "false".to_string(),
        (true, false) => "True".to_string(),
        (false, false) => "False".to_string(),
    }
}

/// `"12.00"` -> `"12"`. Anything else is returned unchanged.
fn collapse_integral(value: &str) -> String {
    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let Some((whole, fraction)) = unsigned.split_once('.') else {
        return value.to_string();
    };
    let is_integral = !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && !fraction.is_empty()
        && fraction.bytes().all(|b| b == b'0');
    if !is_integral {
        return value.to_string();
    }
    if negative && whole.bytes().any(|b| b != b'0') {
        format!("-{whole}")
    } else {
        whole.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        let cell = Cell::text("  red \n\t  blue  ");
        assert_eq!(normalize(&cell, &settings()), "red blue");
        assert_eq!(normalize(&Cell::text(" \t\n "), &settings()), "");
    }

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(normalize(&Cell::Number(1.0), &settings()), "1");
        assert_eq!(normalize(&Cell::Number(-3.0), &settings()), "-3");
        assert_eq!(normalize(&Cell::Number(-0.0), &settings()), "0");
        assert_eq!(normalize(&Cell::Number(2.5), &settings()), "2.5");
        assert_eq!(normalize(&Cell::Number(1e20), &settings()), "100000000000000000000");
        assert_eq!(normalize(&Cell::Int(42), &settings()), "42");
    }

    #[test]
    fn integral_text_drops_fraction() {
        assert_eq!(normalize(&Cell::text("1.0"), &settings()), "1");
        assert_eq!(normalize(&Cell::text("-12.000"), &settings()), "-12");
        assert_eq!(normalize(&Cell::text("-0.0"), &settings()), "0");
        assert_eq!(normalize(&Cell::text("1.05"), &settings()), "1.05");
        assert_eq!(normalize(&Cell::text("1."), &settings()), "1.");
        assert_eq!(normalize(&Cell::text(".0"), &settings()), ".0");
        assert_eq!(normalize(&Cell::text("v1.0"), &settings()), "v1.0");
    }

    #[test]
    fn nan_and_sentinels_are_empty() {
        assert_eq!(normalize(&Cell::Number(f64::NAN), &settings()), "");
        assert_eq!(normalize(&Cell::text("NaN"), &settings()), "");
        assert_eq!(normalize(&Cell::text("<empty>"), &settings()), "");
        assert_eq!(normalize(&Cell::Empty, &settings()), "");
        assert_eq!(normalize(&Cell::text(" nan "), &settings()), "");
    }

    #[test]
    fn infinities_have_text() {
        assert_eq!(normalize(&Cell::Number(f64::INFINITY), &settings()), "inf");
        assert_eq!(normalize(&Cell::Number(f64::NEG_INFINITY), &settings()), "-inf");
    }

    #[test]
    fn booleans_follow_case_setting() {
        assert_eq!(normalize(&Cell::Bool(true), &settings()), "true");
        let upper = Settings {
            lowercase_booleans: false,
            ..Settings::default()
        };
        assert_eq!(normalize(&Cell::Bool(false), &upper), "False");
    }

    #[test]
    fn normalize_str_matches_text_cells() {
        assert_eq!(normalize_str("", &settings()), "");
        assert_eq!(normalize_str(" 7.0 ", &settings()), "7");
    }
}
