//! Arithmetic evaluation for keypad expressions.
//!
//! A small recursive-descent parser over `+ - * /`, parentheses, unary
//! signs and decimal literals. Input passes the character whitelist in
//! [`super::sanitize`] first; nothing outside that grammar is evaluated.

use thiserror::Error;

use super::sanitize::{first_disallowed, to_arithmetic};

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 256;

/// Reasons an expression cannot produce a finite number.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("expression is empty")]
    Empty,
    #[error("disallowed character {0:?} in expression")]
    Disallowed(char),
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
    #[error("unexpected {0:?} in expression")]
    Unexpected(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nests deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Lexeme {
    Number(f64),
    Op(char),
    Open,
    Close,
}

impl Lexeme {
    fn describe(self) -> char {
        match self {
            Self::Number(_) => '0',
            Self::Op(c) => c,
            Self::Open => '(',
            Self::Close => ')',
        }
    }
}

/// Evaluate a canonical keypad expression.
///
/// Returns the numeric value, or the reason evaluation failed. Division
/// by zero and non-finite results are failures, not special values.
pub fn evaluate_expression(expression: &str) -> Result<f64, EvalError> {
    let text = to_arithmetic(expression);
    if let Some(c) = first_disallowed(&text) {
        return Err(EvalError::Disallowed(c));
    }

    let lexemes = lex(&text)?;
    if lexemes.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser {
        lexemes: &lexemes,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(extra) = parser.peek() {
        return Err(EvalError::Unexpected(extra.describe()));
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn lex(text: &str) -> Result<Vec<Lexeme>, EvalError> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '0'..='9' | '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let literal = &text[start..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(literal.to_string()))?;
                out.push(Lexeme::Number(value));
            }
            '+' | '-' | '*' | '/' => out.push(Lexeme::Op(c)),
            '(' => out.push(Lexeme::Open),
            ')' => out.push(Lexeme::Close),
            ' ' => {}
            other => return Err(EvalError::Disallowed(other)),
        }
    }

    Ok(out)
}

struct Parser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Lexeme> {
        self.lexemes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.peek();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    /// expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(Lexeme::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    /// term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(Lexeme::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' {
                value * rhs
            } else if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    /// unary := ('-' | '+') unary | primary
    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Lexeme::Op(sign @ ('+' | '-'))) => {
                self.pos += 1;
                let value = self.nested(Self::unary)?;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    /// primary := number | '(' expression ')'
    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.advance() {
            Some(Lexeme::Number(value)) => Ok(value),
            Some(Lexeme::Open) => {
                let value = self.nested(Self::expression)?;
                match self.advance() {
                    Some(Lexeme::Close) => Ok(value),
                    Some(other) => Err(EvalError::Unexpected(other.describe())),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(other) => Err(EvalError::Unexpected(other.describe())),
            None => Err(EvalError::UnexpectedEnd),
        }
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<f64, EvalError>,
    ) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(evaluate_expression("2+2"), Ok(4.0));
        assert_eq!(evaluate_expression("10-4-3"), Ok(3.0));
        assert_eq!(evaluate_expression("12/3/2"), Ok(2.0));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate_expression("2+3*4"), Ok(14.0));
        assert_eq!(evaluate_expression("(2+3)*4"), Ok(20.0));
        assert_eq!(evaluate_expression("2*3+4*5"), Ok(26.0));
    }

    #[test]
    fn test_canonical_separator() {
        assert_eq!(evaluate_expression("0,5+0,25"), Ok(0.75));
        assert_eq!(evaluate_expression("5,*2"), Ok(10.0));
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(evaluate_expression("-5+2"), Ok(-3.0));
        assert_eq!(evaluate_expression("2*-3"), Ok(-6.0));
        assert_eq!(evaluate_expression("--4"), Ok(4.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate_expression("5/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate_expression("1/(2-2)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_non_finite() {
        let huge = format!("{}*{}", f64::MAX, 10);
        assert_eq!(evaluate_expression(&huge), Err(EvalError::NonFinite));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(evaluate_expression("2+"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate_expression("(2+3"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate_expression("2+3)"), Err(EvalError::Unexpected(')')));
        assert_eq!(evaluate_expression("*2"), Err(EvalError::Unexpected('*')));
        assert_eq!(
            evaluate_expression("1.2.3"),
            Err(EvalError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(evaluate_expression("  "), Err(EvalError::Empty));
    }

    #[test]
    fn test_disallowed_characters() {
        assert_eq!(evaluate_expression("2+a"), Err(EvalError::Disallowed('a')));
        assert_eq!(evaluate_expression("process.exit()"), Err(EvalError::Disallowed('p')));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate_expression(&deep), Err(EvalError::TooDeep));
        let fine = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate_expression(&fine), Ok(1.0));
    }
}
