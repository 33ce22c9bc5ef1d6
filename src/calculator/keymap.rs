//! Keyboard mapping for the calculator.
//!
//! Key names follow browser `KeyboardEvent.key` values so the same table
//! serves a web front end and the terminal driver.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::token::{BinaryOp, Control, Token, UnaryOp};

lazy_static! {
    /// A bracketed key name such as `[Enter]`, or any single non-space character.
    static ref KEY_PATTERN: Regex = Regex::new(r"\[[^\[\]\s]+\]|\S").unwrap();
}

/// Errors raised while reading a typed key sequence.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown key {key:?} at position {position}")]
    UnknownKey { key: String, position: usize },
}

/// Map a keyboard key onto a token.
///
/// Returns `None` for keys the calculator does not react to.
pub fn token_for_key(key: &str) -> Option<Token> {
    let token = match key {
        "Enter" | "=" => Token::Control(Control::Evaluate),
        "Escape" => Token::Control(Control::ClearAll),
        "Delete" => Token::Control(Control::ClearEntry),
        "Backspace" => Token::Control(Control::Backspace),
        "+" => Token::Binary(BinaryOp::Add),
        "-" => Token::Binary(BinaryOp::Subtract),
        "*" => Token::Binary(BinaryOp::Multiply),
        "/" => Token::Binary(BinaryOp::Divide),
        "." | "," => Token::Decimal,
        "(" => Token::OpenParen,
        ")" => Token::CloseParen,
        _ => {
            let mut chars = key.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Token::digit(c),
                _ => None,
            };
        }
    };
    Some(token)
}

/// Map a bracketed name from a typed sequence onto a token.
fn token_for_name(name: &str) -> Option<Token> {
    let token = match name.to_ascii_lowercase().as_str() {
        "enter" => Token::Control(Control::Evaluate),
        "escape" | "esc" => Token::Control(Control::ClearAll),
        "delete" | "del" => Token::Control(Control::ClearEntry),
        "backspace" | "bs" => Token::Control(Control::Backspace),
        "neg" => Token::Unary(UnaryOp::Negate),
        "pct" => Token::Unary(UnaryOp::Percent),
        "inv" => Token::Unary(UnaryOp::Reciprocal),
        "sqr" => Token::Unary(UnaryOp::Square),
        "sqrt" => Token::Unary(UnaryOp::SquareRoot),
        _ => return None,
    };
    Some(token)
}

/// Split a typed line into tokens.
///
/// Single characters map through [`token_for_key`] and then the button
/// labels, so `×`, `÷`, `%` and `√` work as typed. Named keys go in
/// brackets: `[Enter]`, `[Escape]`, `[Backspace]`, `[Delete]`, `[neg]`,
/// `[pct]`, `[inv]`, `[sqr]`, `[sqrt]`. Whitespace is ignored.
pub fn tokens_for_keys(text: &str) -> Result<Vec<Token>, KeyError> {
    KEY_PATTERN
        .find_iter(text)
        .map(|m| {
            let key = m.as_str();
            let token = match key.strip_prefix('[').and_then(|k| k.strip_suffix(']')) {
                Some(name) => token_for_name(name),
                None => token_for_key(key).or_else(|| Token::from_label(key)),
            };
            token.ok_or_else(|| KeyError::UnknownKey {
                key: key.to_string(),
                position: m.start(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_keys() {
        assert_eq!(token_for_key("7"), Some(Token::Digit(7)));
        assert_eq!(token_for_key("Enter"), Some(Token::Control(Control::Evaluate)));
        assert_eq!(token_for_key("="), Some(Token::Control(Control::Evaluate)));
        assert_eq!(token_for_key("Delete"), Some(Token::Control(Control::ClearEntry)));
        assert_eq!(token_for_key("Escape"), Some(Token::Control(Control::ClearAll)));
        assert_eq!(token_for_key("Backspace"), Some(Token::Control(Control::Backspace)));
        assert_eq!(token_for_key("*"), Some(Token::Binary(BinaryOp::Multiply)));
        assert_eq!(token_for_key(","), Some(Token::Decimal));
        assert_eq!(token_for_key("."), Some(Token::Decimal));
        assert_eq!(token_for_key("Shift"), None);
        assert_eq!(token_for_key("a"), None);
    }

    #[test]
    fn test_typed_sequence() {
        let tokens = tokens_for_keys("12 + 3×4[Enter]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Digit(1),
                Token::Digit(2),
                Token::Binary(BinaryOp::Add),
                Token::Digit(3),
                Token::Binary(BinaryOp::Multiply),
                Token::Digit(4),
                Token::Control(Control::Evaluate),
            ]
        );
    }

    #[test]
    fn test_named_keys() {
        let tokens = tokens_for_keys("9[sqrt][neg][BS][esc]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Digit(9),
                Token::Unary(UnaryOp::SquareRoot),
                Token::Unary(UnaryOp::Negate),
                Token::Control(Control::Backspace),
                Token::Control(Control::ClearAll),
            ]
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            tokens_for_keys("2+x"),
            Err(KeyError::UnknownKey {
                key: "x".to_string(),
                position: 2
            })
        );
        assert!(tokens_for_keys("[launch]").is_err());
        assert!(tokens_for_keys("[Enter").is_err());
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(tokens_for_keys("   "), Ok(vec![]));
    }
}
