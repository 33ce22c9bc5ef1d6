//! Result formatting for the calculator display.

use super::token::DECIMAL_SEPARATOR;

/// Text shown in place of a value that cannot be displayed.
pub const ERROR_DISPLAY: &str = "Error";

/// Default number of fractional digits kept in a result.
pub const DEFAULT_PRECISION: usize = 8;

/// Format a result in canonical form.
///
/// Rounds to at most `precision` fractional digits, then strips trailing
/// zeros and a dangling separator. Non-finite values become `"Error"`.
pub fn format_result(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return ERROR_DISPLAY.to_string();
    }

    let formatted = format!("{:.*}", precision, round_half_away(value, precision));
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    // Rounding can leave "-0" behind for tiny negative values.
    let trimmed = match trimmed {
        "-0" => "0",
        other => other,
    };

    trimmed.replace('.', &DECIMAL_SEPARATOR.to_string())
}

/// Round to `precision` fractional digits, ties away from zero.
///
/// `format!` alone rounds exact binary ties to even, so `0.125` would
/// become `0.12`. Values too large to scale exactly are left to `format!`.
fn round_half_away(value: f64, precision: usize) -> f64 {
    let Ok(exp) = i32::try_from(precision) else {
        return value;
    };
    let scale = 10f64.powi(exp);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_SCALED {
        return value;
    }
    scaled.round() / scale
}

/// Above 2^52 every `f64` is already an integer.
const MAX_EXACT_SCALED: f64 = 4_503_599_627_370_496.0;

/// Parse a canonical number such as `"0,25"` or `"-3"`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let valid = !text.is_empty()
        && text
            .strip_prefix('-')
            .unwrap_or(text)
            .chars()
            .all(|c| c.is_ascii_digit() || c == DECIMAL_SEPARATOR);
    if !valid {
        return None;
    }

    text.replace(DECIMAL_SEPARATOR, ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
