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
use gitmedia_git::GitError;
use gitmedia_storage::{Oid, TransportError};
use std::path::PathBuf;
use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Local store I/O
    #[error("media store error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Git(#[from] GitError),

    /// A working tree file could not be replaced with its content
    #[error("failed to expand {path}: {source}")]
    Expand {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Push or pull of a single object failed
    #[error("failed to {action} {oid}: {source}")]
    Object {
        action: &'static str,
        oid: Oid,
        #[source]
        source: TransportError,
    },
}

impl SyncError {
    pub(crate) fn object(action: &'static str, oid: Oid, source: TransportError) -> Self {
        SyncError::Object {
            action,
            oid,
            source,
        }
    }
}
