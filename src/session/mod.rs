//! A calculator session: one engine state plus its calculation history.

mod history;

pub use history::{History, HistoryEntry};

use serde::Serialize;
use tracing::{debug, trace};

use crate::calculator::{Control, Engine, EngineState, Settings, Token, token_for_key};

/// Default number of history entries kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Owns the state of one calculator widget between key presses.
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    state: EngineState,
    history: History,
}

/// Serializable view of a session.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub display: &'a str,
    pub expression: &'a str,
    pub last_result: Option<f64>,
    pub history: &'a History,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self::with_history(settings, DEFAULT_MAX_HISTORY)
    }

    pub fn with_history(settings: Settings, max_history: usize) -> Self {
        Self {
            engine: Engine::new(settings),
            state: EngineState::default(),
            history: History::with_capacity(max_history),
        }
    }

    /// Apply a token and return the new display.
    pub fn press(&mut self, token: Token) -> &str {
        let next = self.engine.process(&self.state, token);
        trace!(?token, display = next.display(), "token processed");

        let finished = token == Token::Control(Control::Evaluate)
            && self.state.last_result().is_none()
            && next.last_result().is_some();
        if finished {
            let entry = HistoryEntry::new(self.state.display(), next.display());
            debug!(expression = %entry.expression, result = %entry.result, "calculation finished");
            self.history.push(entry);
        }

        self.state = next;
        self.state.display()
    }

    /// Apply a keyboard key. Returns `false` if the key is not mapped.
    pub fn press_key(&mut self, key: &str) -> bool {
        match token_for_key(key) {
            Some(token) => {
                self.press(token);
                true
            }
            None => {
                debug!(key, "ignoring unmapped key");
                false
            }
        }
    }

    /// Apply a sequence of tokens and return the final display.
    pub fn press_all(&mut self, tokens: impl IntoIterator<Item = Token>) -> &str {
        for token in tokens {
            self.press(token);
        }
        self.state.display()
    }

    pub fn display(&self) -> &str {
        self.state.display()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            display: self.state.display(),
            expression: self.state.expression(),
            last_result: self.state.last_result(),
            history: &self.history,
        }
    }
}
