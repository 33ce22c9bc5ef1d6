//! Safety boundary between the keypad expression and the evaluator.
//!
//! Expressions are translated from their canonical keypad form into plain
//! arithmetic text and checked against a fixed character whitelist before
//! anything tries to parse them.

use lazy_static::lazy_static;
use regex::Regex;

use super::token::DECIMAL_SEPARATOR;

lazy_static! {
    /// Matches any character outside plain arithmetic.
    /// Allowed: digits, spaces, the four operators, parentheses, dots.
    static ref DISALLOWED_CHAR: Regex = Regex::new(r"[^0-9+\-*/.() ]").unwrap();
}

/// Translate a canonical expression into plain arithmetic text.
///
/// The canonical decimal separator becomes `.` and display glyphs that
/// may have slipped in are mapped to their ASCII operators. Any other
/// character is passed through untouched so [`is_arithmetic`] can reject it.
pub fn to_arithmetic(expression: &str) -> String {
    expression
        .chars()
        .map(|c| match c {
            DECIMAL_SEPARATOR => '.',
            '×' => '*',
            '÷' => '/',
            '−' => '-',
            other => other,
        })
        .collect()
}

/// Check that translated text holds nothing but arithmetic characters.
pub fn is_arithmetic(text: &str) -> bool {
    !DISALLOWED_CHAR.is_match(text)
}

/// Find the first character that fails the whitelist, if any.
pub fn first_disallowed(text: &str) -> Option<char> {
    DISALLOWED_CHAR
        .find(text)
        .and_then(|m| m.as_str().chars().next())
}
