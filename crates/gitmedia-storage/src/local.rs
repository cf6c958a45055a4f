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
//! Local filesystem transport
//!
//! The "remote" is a directory, typically on a network mount, holding one
//! flat file per object:
//!
//! ```text
//! /srv/media/
//!   aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d
//!   da39a3ee5e6b4b0d3255bfef95601890afd80709
//! ```
//!
//! Uploads are copied to a temp file inside the target directory and renamed
//! into place, so readers never observe a partial object.

use crate::error::{TransportError, TransportResult};
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    pub fn new(root: impl AsRef<Path>) -> Self {
        LocalTransport {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, oid: &Oid) -> PathBuf {
        self.root.join(oid.to_hex())
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        match fs::metadata(self.object_path(oid)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        match fs::copy(self.object_path(oid), dest).await {
            Ok(bytes) => {
                debug!(%oid, bytes, "Copied object from local remote");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TransportError::NotFound(*oid)),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        fs::create_dir_all(&self.root).await?;

        let root = self.root.clone();
        let staged = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".incoming-")
                .tempfile_in(root)
                .map(|file| file.into_temp_path())
        })
        .await
        .map_err(io::Error::other)??;

        let bytes = fs::copy(src, &staged).await?;
        staged
            .persist(self.object_path(oid))
            .map_err(|e| TransportError::Io(e.error))?;
        debug!(%oid, bytes, "Copied object to local remote");
        Ok(())
    }
}
