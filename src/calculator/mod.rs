//! Calculator module for keypad-driven arithmetic.
//!
//! This module provides functionality to:
//! - Map keys and button labels onto input tokens
//! - Advance the keypad state machine one token at a time
//! - Evaluate finished expressions without dynamic code execution
//! - Copy results to the clipboard

mod clipboard;
mod engine;
mod evaluation;
mod format;
mod keymap;
mod sanitize;
mod token;

pub use clipboard::{copy_display, copy_to_clipboard};
pub use engine::{Engine, EngineState, Settings, process_token};
pub use evaluation::{EvalError, evaluate_expression};
pub use format::{DEFAULT_PRECISION, ERROR_DISPLAY, format_result};
pub use keymap::{KeyError, token_for_key, tokens_for_keys};
pub use token::{BinaryOp, Control, DECIMAL_SEPARATOR, OperatorGlyphs, Token, UnaryOp};
