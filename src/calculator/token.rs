//! Input tokens accepted by the calculator engine.
//!
//! Operators carry a canonical symbol (what the engine stores in the
//! expression) and a glyph (what the display shows). The two are kept
//! apart so the display style can change without touching evaluation.

use serde::{Deserialize, Serialize};

/// Canonical decimal separator stored in expressions.
pub const DECIMAL_SEPARATOR: char = ',';

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Symbol stored in the expression.
    pub fn canonical(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Look up an operator by its canonical symbol.
    pub fn from_canonical(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.canonical() == c)
    }

    /// Symbol shown on the display for the given glyph style.
    pub fn glyph(self, style: OperatorGlyphs) -> char {
        match (style, self) {
            (OperatorGlyphs::Ascii, op) => op.canonical(),
            (OperatorGlyphs::Unicode, Self::Add) => '+',
            (OperatorGlyphs::Unicode, Self::Subtract) => '−',
            (OperatorGlyphs::Unicode, Self::Multiply) => '×',
            (OperatorGlyphs::Unicode, Self::Divide) => '÷',
        }
    }
}

/// A function applied to the single value currently on the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Percent,
    Reciprocal,
    Square,
    SquareRoot,
}

impl UnaryOp {
    /// Apply the operation. Returns `None` outside the operation's domain.
    pub fn apply(self, x: f64) -> Option<f64> {
        let value = match self {
            Self::Negate => -x,
            Self::Percent => x / 100.0,
            Self::Reciprocal if x == 0.0 => return None,
            Self::Reciprocal => 1.0 / x,
            Self::Square => x * x,
            Self::SquareRoot if x < 0.0 => return None,
            Self::SquareRoot => x.sqrt(),
        };
        value.is_finite().then_some(value)
    }
}

/// Control keys that do not contribute characters to the expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ClearAll,
    ClearEntry,
    Backspace,
    Evaluate,
}

/// One discrete unit of user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A decimal digit, always in `0..=9`.
    Digit(u8),
    Decimal,
    Binary(BinaryOp),
    Unary(UnaryOp),
    OpenParen,
    CloseParen,
    Control(Control),
}

impl Token {
    /// Build a digit token from a character.
    pub fn digit(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self::Digit(d as u8))
    }

    /// Map a calculator button label onto its token.
    pub fn from_label(label: &str) -> Option<Self> {
        let token = match label.trim() {
            "C" | "AC" => Self::Control(Control::ClearAll),
            "CE" => Self::Control(Control::ClearEntry),
            "⌫" | "←" => Self::Control(Control::Backspace),
            "=" => Self::Control(Control::Evaluate),
            "±" | "+/-" => Self::Unary(UnaryOp::Negate),
            "%" => Self::Unary(UnaryOp::Percent),
            "1/x" | "⅟x" => Self::Unary(UnaryOp::Reciprocal),
            "x²" | "x^2" => Self::Unary(UnaryOp::Square),
            "√x" | "√" | "sqrt" => Self::Unary(UnaryOp::SquareRoot),
            "+" => Self::Binary(BinaryOp::Add),
            "−" | "-" => Self::Binary(BinaryOp::Subtract),
            "×" | "*" => Self::Binary(BinaryOp::Multiply),
            "÷" | "/" => Self::Binary(BinaryOp::Divide),
            "," | "." => Self::Decimal,
            "(" => Self::OpenParen,
            ")" => Self::CloseParen,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => return Self::digit(c),
                    _ => return None,
                }
            }
        };
        Some(token)
    }
}

/// Display style for binary operators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorGlyphs {
    /// `+ − × ÷`
    #[default]
    Unicode,
    /// `+ - * /`
    Ascii,
}
