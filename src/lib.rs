//! Keypad calculator engine.
//!
//! [`calculator`] holds the token state machine and the restricted
//! evaluator, [`session`] wraps one engine state with its history, and
//! [`config`] loads the user's display settings.

pub mod calculator;
pub mod config;
pub mod session;
