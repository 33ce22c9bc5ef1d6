//! The keypad state machine.
//!
//! Every token produces a fresh [`EngineState`]; the previous state is
//! never mutated. The engine only knows about the display settings it was
//! built with and keeps nothing else between calls.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::evaluation::evaluate_expression;
use super::format::{DEFAULT_PRECISION, ERROR_DISPLAY, format_result, parse_number};
use super::token::{BinaryOp, Control, DECIMAL_SEPARATOR, OperatorGlyphs, Token, UnaryOp};

/// Display settings the engine renders with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum fractional digits kept in results.
    pub precision: usize,
    /// Glyph shown for the decimal separator (`,` or `.`).
    pub decimal_glyph: char,
    /// Glyph style for binary operators.
    pub operator_glyphs: OperatorGlyphs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            decimal_glyph: DECIMAL_SEPARATOR,
            operator_glyphs: OperatorGlyphs::Unicode,
        }
    }
}

/// Snapshot of a calculator between two key presses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineState {
    expression: String,
    display: String,
    last_result: Option<f64>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            expression: String::new(),
            display: "0".to_string(),
            last_result: None,
        }
    }
}

impl EngineState {
    /// The accumulated expression in canonical symbols.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The text to render. Never empty.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The value on the display when it shows a finished result.
    pub fn last_result(&self) -> Option<f64> {
        self.last_result
    }

    /// Whether the display currently shows the error marker.
    pub fn is_error(&self) -> bool {
        self.display == ERROR_DISPLAY
    }
}

/// Apply one token with default settings.
pub fn process_token(state: &EngineState, token: Token) -> EngineState {
    Engine::default().process(state, token)
}

/// Token processor bound to a set of display settings.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    settings: Settings,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Apply one token to `state`, returning the next state.
    pub fn process(&self, state: &EngineState, token: Token) -> EngineState {
        match token {
            Token::Control(Control::ClearAll | Control::ClearEntry) => EngineState::default(),
            Token::Control(Control::Backspace) => self.backspace(state),
            Token::Control(Control::Evaluate) => self.evaluate(state),
            Token::Digit(digit) => self.digit(state, digit),
            Token::Decimal => self.decimal(state),
            Token::Binary(op) => self.binary(state, op),
            Token::Unary(op) => self.unary(state, op),
            Token::OpenParen => self.open_paren(state),
            Token::CloseParen => self.close_paren(state),
        }
    }

    fn digit(&self, state: &EngineState, digit: u8) -> EngineState {
        let Some(c) = char::from_digit(u32::from(digit), 10) else {
            return state.clone();
        };

        if state.last_result.is_some() {
            return self.editing(c.to_string());
        }

        let mut expression = state.expression.clone();
        expression.push(c);
        self.editing(expression)
    }

    fn decimal(&self, state: &EngineState) -> EngineState {
        if state.last_result.is_some() {
            return self.editing(format!("0{DECIMAL_SEPARATOR}"));
        }

        let run = current_run(&state.expression);
        if run.contains(DECIMAL_SEPARATOR) {
            return state.clone();
        }

        let mut expression = state.expression.clone();
        let last = expression.chars().last();
        match last {
            None => expression.push('0'),
            Some(c) if is_operator(c) || c == '(' => expression.push('0'),
            Some(_) => {}
        }
        expression.push(DECIMAL_SEPARATOR);
        self.editing(expression)
    }

    fn binary(&self, state: &EngineState, op: BinaryOp) -> EngineState {
        let mut expression = state.expression.clone();

        if state.last_result.is_none() {
            if expression.is_empty() {
                expression.push('0');
            } else if expression.chars().last().is_some_and(is_operator) {
                expression.pop();
            }
        }

        expression.push(op.canonical());
        self.editing(expression)
    }

    fn unary(&self, state: &EngineState, op: UnaryOp) -> EngineState {
        let canonical = self.to_canonical(&state.display);
        let Some(value) = parse_number(&canonical) else {
            return self.error(format_args!("{:?} is not a single number", state.display));
        };

        match op.apply(value) {
            Some(result) => self.result(result),
            None => self.error(format_args!("{op:?} is undefined for {value}")),
        }
    }

    fn open_paren(&self, state: &EngineState) -> EngineState {
        if state.last_result.is_some() {
            return self.editing("(".to_string());
        }

        let mut expression = state.expression.clone();
        expression.push('(');
        self.editing(expression)
    }

    fn close_paren(&self, state: &EngineState) -> EngineState {
        let mut expression = state.expression.clone();
        expression.push(')');
        self.editing(expression)
    }

    fn backspace(&self, state: &EngineState) -> EngineState {
        if state.last_result.is_some() || state.expression.chars().count() <= 1 {
            return EngineState::default();
        }

        let mut expression = state.expression.clone();
        expression.pop();
        self.editing(expression)
    }

    fn evaluate(&self, state: &EngineState) -> EngineState {
        if state.expression.trim().is_empty() {
            return state.clone();
        }

        match evaluate_expression(&state.expression) {
            Ok(value) => self.result(value),
            Err(err) => self.error(err),
        }
    }

    /// State for an expression that is still being typed.
    fn editing(&self, expression: String) -> EngineState {
        let display = if expression.is_empty() {
            "0".to_string()
        } else {
            self.render(&expression)
        };

        EngineState {
            expression,
            display,
            last_result: None,
        }
    }

    /// State for a finished computation.
    fn result(&self, value: f64) -> EngineState {
        let expression = format_result(value, self.settings.precision);
        if expression == ERROR_DISPLAY {
            return self.error(format_args!("{value} cannot be displayed"));
        }

        EngineState {
            display: self.render(&expression),
            expression,
            last_result: Some(value),
        }
    }

    fn error(&self, cause: impl Display) -> EngineState {
        debug!(%cause, "calculator entered error state");
        EngineState {
            expression: String::new(),
            display: ERROR_DISPLAY.to_string(),
            last_result: None,
        }
    }

    /// Render a canonical expression with the configured glyphs.
    pub fn render(&self, expression: &str) -> String {
        let mut out = String::with_capacity(expression.len());
        let mut prev: Option<char> = None;

        for c in expression.chars() {
            let glyph = match c {
                DECIMAL_SEPARATOR => self.settings.decimal_glyph,
                // A minus with nothing numeric before it is a sign, not an operator.
                '-' if !prev.is_some_and(ends_operand) => '-',
                c => match BinaryOp::from_canonical(c) {
                    Some(op) => op.glyph(self.settings.operator_glyphs),
                    None => c,
                },
            };
            out.push(glyph);
            prev = Some(c);
        }

        out
    }

    /// Map rendered display text back to canonical symbols.
    pub fn to_canonical(&self, display: &str) -> String {
        display
            .chars()
            .map(|c| match c {
                '−' => '-',
                '×' => '*',
                '÷' => '/',
                c if c == self.settings.decimal_glyph => DECIMAL_SEPARATOR,
                c => c,
            })
            .collect()
    }
}

fn ends_operand(c: char) -> bool {
    c.is_ascii_digit() || c == DECIMAL_SEPARATOR || c == ')'
}

fn is_operator(c: char) -> bool {
    BinaryOp::from_canonical(c).is_some()
}

/// The numeric run at the end of an expression, after the last operator
/// or parenthesis.
fn current_run(expression: &str) -> &str {
    match expression.rfind(|c: char| is_operator(c) || c == '(' || c == ')') {
        Some(i) => &expression[i + 1..],
        None => expression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(tokens: &[Token]) -> EngineState {
        let engine = Engine::default();
        tokens
            .iter()
            .fold(EngineState::default(), |state, &token| engine.process(&state, token))
    }

    fn keys(labels: &[&str]) -> EngineState {
        let tokens: Vec<Token> = labels
            .iter()
            .map(|label| Token::from_label(label).unwrap())
            .collect();
        press(&tokens)
    }

    #[test]
    fn test_initial_state() {
        let state = EngineState::default();
        assert_eq!(state.expression(), "");
        assert_eq!(state.display(), "0");
        assert_eq!(state.last_result(), None);
    }

    #[test]
    fn test_digits_concatenate() {
        let state = keys(&["0", "0", "7", "4"]);
        assert_eq!(state.display(), "0074");
        assert_eq!(state.expression(), "0074");
    }

    #[test]
    fn test_precedence() {
        let state = keys(&["2", "+", "3", "×", "4"]);
        assert_eq!(state.display(), "2+3×4");
        assert_eq!(state.expression(), "2+3*4");

        let state = keys(&["2", "+", "3", "×", "4", "="]);
        assert_eq!(state.display(), "14");
        assert_eq!(state.last_result(), Some(14.0));
    }

    #[test]
    fn test_division_by_zero() {
        let state = keys(&["5", "÷", "0", "="]);
        assert_eq!(state.display(), "Error");
        assert_eq!(state.expression(), "");
        assert_eq!(state.last_result(), None);
        assert!(state.is_error());
    }

    #[test]
    fn test_recover_from_error() {
        let state = keys(&["5", "÷", "0", "=", "7"]);
        assert_eq!(state.display(), "7");
        let state = keys(&["5", "÷", "0", "=", "C"]);
        assert_eq!(state, EngineState::default());
    }

    #[test]
    fn test_reciprocal() {
        let state = keys(&["0", "1/x"]);
        assert_eq!(state.display(), "Error");

        let state = keys(&["4", "1/x"]);
        assert_eq!(state.display(), "0,25");
        assert_eq!(state.expression(), "0,25");
        assert_eq!(state.last_result(), Some(0.25));
    }

    #[test]
    fn test_reciprocal_of_initial_display() {
        let state = keys(&["1/x"]);
        assert!(state.is_error());
    }

    #[test]
    fn test_other_unary_ops() {
        assert_eq!(keys(&["9", "√x"]).display(), "3");
        assert_eq!(keys(&["9", "±"]).display(), "-9");
        assert_eq!(keys(&["9", "±", "±"]).display(), "9");
        assert_eq!(keys(&["5", "0", "%"]).display(), "0,5");
        assert_eq!(keys(&["1", "2", "x²"]).display(), "144");
        assert!(keys(&["9", "±", "√x"]).is_error());
    }

    #[test]
    fn test_unary_on_unfinished_expression() {
        assert!(keys(&["2", "+", "9", "√x"]).is_error());
    }

    #[test]
    fn test_unary_on_initial_display() {
        let state = keys(&["±"]);
        assert_eq!(state.display(), "0");
        assert_eq!(state.last_result(), Some(-0.0));
    }

    #[test]
    fn test_digit_after_result_starts_fresh() {
        let state = keys(&["2", "+", "3", "=", "7"]);
        assert_eq!(state.expression(), "7");
        assert_eq!(state.display(), "7");
        assert_eq!(state.last_result(), None);
    }

    #[test]
    fn test_operator_after_result_chains() {
        let state = keys(&["2", "+", "3", "=", "×", "4"]);
        assert_eq!(state.expression(), "5*4");
        assert_eq!(state.last_result(), None);
        assert_eq!(keys(&["2", "+", "3", "=", "×", "4", "="]).display(), "20");
    }

    #[test]
    fn test_negative_result_chains() {
        let state = keys(&["3", "−", "5", "=", "−", "1"]);
        assert_eq!(state.expression(), "-2-1");
        assert_eq!(state.display(), "-2−1");
        assert_eq!(keys(&["3", "−", "5", "=", "−", "1", "="]).display(), "-3");
    }

    #[test]
    fn test_operator_collapsing() {
        let state = keys(&["2", "+", "−"]);
        assert_eq!(state.expression(), "2-");
        let state = keys(&["2", "+", "−", "×", "÷"]);
        assert_eq!(state.expression(), "2/");
        assert_eq!(keys(&["8", "+", "×", "2", "="]).display(), "16");
    }

    #[test]
    fn test_operator_on_empty_expression() {
        let state = keys(&["+"]);
        assert_eq!(state.expression(), "0+");
        assert_eq!(keys(&["−", "5", "="]).display(), "-5");
    }

    #[test]
    fn test_decimal_separator() {
        assert_eq!(keys(&[","]).expression(), "0,");
        assert_eq!(keys(&["3", ","]).expression(), "3,");
        assert_eq!(keys(&["3", ",", "5", ","]).expression(), "3,5");
        assert_eq!(keys(&["3", ",", "5", "+", ","]).expression(), "3,5+0,");
        assert_eq!(keys(&["3", ",", "5", "+", "1", ",", "5", "="]).display(), "5");
    }

    #[test]
    fn test_decimal_after_result() {
        let state = keys(&["2", "+", "3", "=", ","]);
        assert_eq!(state.expression(), "0,");
        assert_eq!(state.last_result(), None);
    }

    #[test]
    fn test_duplicate_decimal_is_noop() {
        let before = keys(&["1", ",", "2"]);
        let after = Engine::default().process(&before, Token::Decimal);
        assert_eq!(before, after);
    }

    #[test]
    fn test_backspace() {
        assert_eq!(keys(&["1", "2", "3", "⌫"]).display(), "12");
        assert_eq!(keys(&["1", "⌫"]), EngineState::default());
        assert_eq!(keys(&["⌫"]).display(), "0");
        assert_eq!(keys(&["1", "+", "⌫"]).expression(), "1");
    }

    #[test]
    fn test_backspace_after_result_clears() {
        let state = keys(&["2", "+", "3", "=", "⌫"]);
        assert_eq!(state, EngineState::default());
    }

    #[test]
    fn test_clear_entry_matches_clear_all() {
        let base = keys(&["2", "+", "3"]);
        let engine = Engine::default();
        assert_eq!(
            engine.process(&base, Token::Control(Control::ClearEntry)),
            engine.process(&base, Token::Control(Control::ClearAll))
        );
    }

    #[test]
    fn test_empty_evaluate_is_noop() {
        let state = keys(&["="]);
        assert_eq!(state, EngineState::default());
    }

    #[test]
    fn test_malformed_evaluate() {
        assert!(keys(&["2", "+", "="]).is_error());
        assert!(keys(&["(", "2", "+", "3", "="]).is_error());
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(keys(&["(", "2", "+", "3", ")", "×", "4", "="]).display(), "20");
        assert_eq!(keys(&["(", ","]).expression(), "(0,");
        assert_eq!(keys(&["2", "=", "("]).expression(), "(");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(keys(&["1", "÷", "3", "="]).display(), "0,33333333");
        assert_eq!(keys(&["1", "÷", "5", "1", "2", "="]).display(), "0,00195313");
        assert_eq!(keys(&["0", ",", "1", "+", "0", ",", "2", "="]).display(), "0,3");
    }

    #[test]
    fn test_ascii_settings() {
        let engine = Engine::new(Settings {
            decimal_glyph: '.',
            operator_glyphs: OperatorGlyphs::Ascii,
            ..Settings::default()
        });
        let tokens = [
            Token::Digit(1),
            Token::Decimal,
            Token::Digit(5),
            Token::Binary(BinaryOp::Multiply),
        ];
        let state = tokens
            .into_iter()
            .fold(EngineState::default(), |state, token| engine.process(&state, token));
        assert_eq!(state.display(), "1.5*");
        assert_eq!(state.expression(), "1,5*");

        let state = engine.process(&state, Token::Digit(2));
        let state = engine.process(&state, Token::Control(Control::Evaluate));
        assert_eq!(state.display(), "3");

        let state = engine.process(&state, Token::Unary(UnaryOp::Reciprocal));
        assert_eq!(state.display(), "0.33333333");
        let state = engine.process(&state, Token::Unary(UnaryOp::Negate));
        assert_eq!(state.display(), "-0.33333333");
    }

    #[test]
    fn test_process_token_is_pure() {
        let state = keys(&["4", "+"]);
        let copy = state.clone();
        let _ = process_token(&state, Token::Digit(2));
        assert_eq!(state, copy);
    }

    #[test]
    fn test_invalid_digit_ignored() {
        let state = keys(&["4"]);
        assert_eq!(process_token(&state, Token::Digit(12)), state);
    }
}
