// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Configuration for structured logging.

use std::str::FromStr;
use thiserror::Error;

/// Environment variable consulted before `RUST_LOG`
pub const LEVEL_ENV: &str = "GIT_MEDIA_LOG";

/// Errors that can occur during logging configuration
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Unknown log format '{0}'. Expected one of: pretty, compact, json")]
    InvalidFormat(String),

    #[error("Failed to parse log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Output format for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,

    /// Single-line output
    #[default]
    Compact,

    /// JSON format for machine-readable logs
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,

    /// Filter directive such as `info` or `gitmedia_storage=debug`
    ///
    /// If None, taken from the environment.
    pub level: Option<String>,

    /// Whether to use colored output
    pub use_color: bool,

    pub use_timestamps: bool,

    /// Whether to include target module names
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level from `-v`/`-q` command line flags
    ///
    /// With neither flag given the level is left to the environment.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Some("error"),
            (false, 0) => None,
            (false, 1) => Some("debug"),
            (false, _) => Some("trace"),
        };
        LogConfig {
            level: level.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Explicit level, else `GIT_MEDIA_LOG`, else `RUST_LOG`, else `info`
    pub fn get_effective_level(&self) -> String {
        self.effective_level_from(|name| std::env::var(name).ok())
    }

    fn effective_level_from(&self, env: impl Fn(&str) -> Option<String>) -> String {
        self.level
            .clone()
            .or_else(|| env(LEVEL_ENV).filter(|v| !v.is_empty()))
            .or_else(|| env("RUST_LOG").filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "info".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(LogConfig::from_verbosity(0, false).level, None);
        assert_eq!(LogConfig::from_verbosity(1, false).level.as_deref(), Some("debug"));
        assert_eq!(LogConfig::from_verbosity(3, false).level.as_deref(), Some("trace"));
        assert_eq!(LogConfig::from_verbosity(2, true).level.as_deref(), Some("error"));
    }

    #[test]
    fn test_level_precedence() {
        let env = |name: &str| match name {
            LEVEL_ENV => Some("warn".to_string()),
            "RUST_LOG" => Some("trace".to_string()),
            _ => None,
        };
        assert_eq!(LogConfig::new().effective_level_from(env), "warn");
        assert_eq!(LogConfig::new().with_level("debug").effective_level_from(env), "debug");

        let rust_log_only = |name: &str| (name == "RUST_LOG").then(|| "trace".to_string());
        assert_eq!(LogConfig::new().effective_level_from(rust_log_only), "trace");

        let empty = |_: &str| Some(String::new());
        assert_eq!(LogConfig::new().effective_level_from(empty), "info");
    }
}
