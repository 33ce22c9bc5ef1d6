//! Configuration file handling.
//!
//! Settings live in `$XDG_CONFIG_HOME/zcalc/config.toml`. Every field is
//! optional; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculator::{DECIMAL_SEPARATOR, DEFAULT_PRECISION, OperatorGlyphs, Settings};
use crate::session::DEFAULT_MAX_HISTORY;

/// Largest precision that still survives a round trip through `f64`.
pub const MAX_PRECISION: usize = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("precision {0} is larger than the maximum of {MAX_PRECISION}")]
    Precision(usize),
    #[error("decimal glyph must be ',' or '.', got {0:?}")]
    DecimalGlyph(char),
}

/// User configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum fractional digits in results.
    pub precision: usize,
    /// Decimal separator shown on the display.
    pub decimal_glyph: char,
    /// `unicode` or `ascii` operator glyphs.
    pub operator_glyphs: OperatorGlyphs,
    /// Number of finished calculations kept per session.
    pub max_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            decimal_glyph: DECIMAL_SEPARATOR,
            operator_glyphs: OperatorGlyphs::default(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("zcalc").join("config.toml"))
    }

    /// Load the config.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => {
                    debug!("no config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.clone(), source },
            other => other,
        })?;

        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Precision(self.precision));
        }
        if !matches!(self.decimal_glyph, ',' | '.') {
            return Err(ConfigError::DecimalGlyph(self.decimal_glyph));
        }
        Ok(())
    }

    /// Engine settings derived from this config.
    pub fn settings(&self) -> Settings {
        Settings {
            precision: self.precision,
            decimal_glyph: self.decimal_glyph,
            operator_glyphs: self.operator_glyphs,
        }
    }
}
