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
use crate::oid::Oid;
use gitmedia_config::ConfigError;
use std::io;
use thiserror::Error;

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised by remote transports and the operations derived from them
#[derive(Error, Debug)]
pub enum TransportError {
    /// The remote does not hold the object
    #[error("object {0} not found on remote")]
    NotFound(Oid),

    /// The remote could not be reached; retried per the retry policy
    #[error("{backend} transport unreachable: {reason}")]
    Unreachable {
        backend: &'static str,
        reason: String,
    },

    /// Credentials were rejected
    #[error("{backend} transport rejected credentials: {reason}")]
    AuthenticationFailed {
        backend: &'static str,
        reason: String,
    },

    /// Local I/O error while staging or reading an object
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fetched content does not hash to the requested oid
    #[error("integrity check failed: expected {expected}, got {actual}")]
    Integrity { expected: Oid, actual: Oid },

    /// Transport configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Any other backend failure
    #[error("{backend} transport error: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
}

impl TransportError {
    pub fn unreachable(backend: &'static str, reason: impl ToString) -> Self {
        TransportError::Unreachable {
            backend,
            reason: reason.to_string(),
        }
    }

    pub fn auth_failed(backend: &'static str, reason: impl ToString) -> Self {
        TransportError::AuthenticationFailed {
            backend,
            reason: reason.to_string(),
        }
    }

    pub fn backend(backend: &'static str, reason: impl ToString) -> Self {
        TransportError::Backend {
            backend,
            reason: reason.to_string(),
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound(_))
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Unreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let oid = Oid::hash(b"hello");
        let err = TransportError::NotFound(oid);
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "object aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d not found on remote"
        );

        let err = TransportError::unreachable("webdav", "connection refused");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "webdav transport unreachable: connection refused");

        assert!(!TransportError::auth_failed("s3", "AccessDenied").is_retryable());
    }

    #[test]
    fn test_config_error_transparent() {
        let err = TransportError::from(ConfigError::NotConfigured);
        assert_eq!(err.to_string(), "git-media.transport not set");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::other("disk full");
        assert!(matches!(TransportError::from(io_err), TransportError::Io(_)));
    }
}
