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
//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration failures, reported before any transfer starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `git-media.transport` is unset or empty
    #[error("git-media.transport not set")]
    NotConfigured,

    /// `git-media.transport` names an unknown backend
    #[error("invalid transport '{0}', expected one of: local, scp, s3, atmos, drive, hashstash, webdav")]
    UnknownTransport(String),

    /// A key the selected backend needs is missing
    #[error("{key} not set for {kind} transport")]
    MissingRequired {
        /// Git config key, e.g. `git-media.scphost`
        key: String,
        /// Backend that needs it
        kind: &'static str,
    },

    /// A value is present but unusable
    #[error("Invalid configuration value for field '{field}': {reason}")]
    InvalidValue {
        /// Key or field name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The underlying config store could not be read
    #[error("Failed to read configuration key '{key}': {reason}")]
    Source {
        /// Key being read
        key: String,
        /// Error reported by the store
        reason: String,
    },

    /// The netrc file exists but could not be read
    #[error("Failed to read credential file {}: {source}", path.display())]
    Credentials {
        /// File that failed
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Missing key for the given backend
    pub fn missing(key: impl Into<String>, kind: &'static str) -> Self {
        ConfigError::MissingRequired {
            key: key.into(),
            kind,
        }
    }

    /// Rejected value for `field`
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Failure of the config store while reading `key`
    pub fn source(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ConfigError::Source {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
