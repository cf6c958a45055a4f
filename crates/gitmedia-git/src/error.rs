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
use gitmedia_config::ConfigError;
use gitmedia_storage::{Oid, TransportError};
use thiserror::Error;

/// Result type for git integration operations
pub type GitResult<T> = Result<T, GitError>;

#[derive(Error, Debug)]
pub enum GitError {
    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Eager upload from the clean filter failed
    #[error("failed to upload media {oid} for {path}: {source}")]
    UploadFailed {
        oid: Oid,
        path: String,
        #[source]
        source: TransportError,
    },

    /// The smudge filter could not obtain the object
    #[error("media {oid} for {path} is not available: {source}")]
    FetchFailed {
        oid: Oid,
        path: String,
        #[source]
        source: TransportError,
    },

    /// Filter driver already registered with different commands
    #[error("filter.media is already configured as '{0}'; use --force to overwrite")]
    AlreadyInstalled(String),

    /// .gitattributes configuration error
    #[error("Failed to configure .gitattributes: {0}")]
    GitattributesConfig(String),

    /// Repository not initialized
    #[error("not a git repository: {0}")]
    RepositoryNotFound(String),

    /// Operation needs a working tree
    #[error("repository at {0} has no working tree")]
    BareRepository(String),
}

impl GitError {
    pub fn upload_failed(oid: Oid, path: &str, source: TransportError) -> Self {
        GitError::UploadFailed {
            oid,
            path: path.to_string(),
            source,
        }
    }

    pub fn fetch_failed(oid: Oid, path: &str, source: TransportError) -> Self {
        GitError::FetchFailed {
            oid,
            path: path.to_string(),
            source,
        }
    }
}
