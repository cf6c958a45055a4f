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
//! Local content-addressed media store
//!
//! Objects live under `<git-dir>/media/objects`, sharded by the first two hex
//! digits of their oid:
//!
//! ```text
//! .git/media/
//!   objects/
//!     aa/
//!       aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d
//!   tmp/
//! ```
//!
//! Objects only ever appear through [`ContentStore::commit`], which renames a
//! fully written temp file from `tmp/` into place. A name visible under
//! `objects/` therefore always refers to complete content.

use crate::oid::{Oid, OidHasher};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

/// Read buffer size for hashing and copying
pub const CHUNK_SIZE: usize = 64 * 1024;

/// File mode of committed objects
#[cfg(unix)]
const OBJECT_MODE: u32 = 0o644;

/// Filesystem-backed object cache
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    tmp: PathBuf,
}

/// A staged object that has not been committed yet
///
/// The file is removed when dropped uncommitted.
#[derive(Debug)]
pub struct TempObject {
    path: TempPath,
}

impl TempObject {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of streaming content into the store's staging area
#[derive(Debug)]
pub struct Ingested {
    pub oid: Oid,
    pub temp: TempObject,
    pub size: u64,
}

impl ContentStore {
    /// Store for the repository whose git directory is `git_dir`
    pub fn for_git_dir(git_dir: impl AsRef<Path>) -> Self {
        let media = git_dir.as_ref().join("media");
        ContentStore {
            root: media.join("objects"),
            tmp: media.join("tmp"),
        }
    }

    /// Store with explicit object and staging directories
    ///
    /// Both must be on the same filesystem for commits to be atomic.
    pub fn with_dirs(root: impl Into<PathBuf>, tmp: impl Into<PathBuf>) -> Self {
        ContentStore {
            root: root.into(),
            tmp: tmp.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of `oid`, without touching the filesystem
    pub fn object_path(&self, oid: &Oid) -> PathBuf {
        self.root.join(oid.shard()).join(oid.to_hex())
    }

    /// Final location of `oid`, creating its shard directory if needed
    pub async fn path_for(&self, oid: &Oid) -> io::Result<PathBuf> {
        let path = self.object_path(oid);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(path)
    }

    /// Every oid currently present, sorted
    ///
    /// Scans the directory tree on each call. Entries that are not a valid
    /// oid inside its matching shard directory are skipped.
    pub async fn list_all(&self) -> io::Result<Vec<Oid>> {
        let mut shards = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut oids = Vec::new();
        while let Some(shard) = shards.next_entry().await? {
            let shard_path = shard.path();
            if !shard.file_type().await?.is_dir() {
                warn!(path = %shard_path.display(), "Ignoring stray file in media store");
                continue;
            }
            let shard_name = shard.file_name();

            let mut entries = fs::read_dir(&shard_path).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    continue;
                }
                let name = entry.file_name();
                let parsed = name.to_str().and_then(|n| n.parse::<Oid>().ok());
                match parsed {
                    Some(oid) if Some(oid.shard().as_str()) == shard_name.to_str() => {
                        oids.push(oid)
                    }
                    _ => warn!(path = %entry.path().display(), "Ignoring unrecognized entry in media store"),
                }
            }
        }

        oids.sort();
        Ok(oids)
    }

    /// Whether a regular file exists for `oid`
    pub async fn contains(&self, oid: &Oid) -> bool {
        fs::metadata(self.object_path(oid))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    pub async fn size_of(&self, oid: &Oid) -> io::Result<u64> {
        Ok(fs::metadata(self.object_path(oid)).await?.len())
    }

    pub async fn open(&self, oid: &Oid) -> io::Result<fs::File> {
        fs::File::open(self.object_path(oid)).await
    }

    /// Delete `oid`; returns false when it was not present
    pub async fn remove(&self, oid: &Oid) -> io::Result<bool> {
        match fs::remove_file(self.object_path(oid)).await {
            Ok(()) => {
                debug!(%oid, "Removed object from media store");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create an empty staging file next to the store
    pub async fn temp_file(&self) -> io::Result<TempObject> {
        fs::create_dir_all(&self.tmp).await?;
        let tmp = self.tmp.clone();
        let path = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix("incoming-")
                .tempfile_in(tmp)
                .map(|file| file.into_temp_path())
        })
        .await
        .map_err(io::Error::other)??;
        Ok(TempObject { path })
    }

    /// Atomically move a fully written staging file into place as `oid`
    pub async fn commit(&self, temp: TempObject, oid: &Oid) -> io::Result<PathBuf> {
        let dest = self.path_for(oid).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(OBJECT_MODE)).await?;
        }

        temp.path.persist(&dest).map_err(|e| e.error)?;
        debug!(%oid, path = %dest.display(), "Committed object to media store");
        Ok(dest)
    }

    /// Stream `reader` into a staging file while hashing it
    ///
    /// Memory use is bounded by [`CHUNK_SIZE`] regardless of input size.
    pub async fn ingest<R>(&self, mut reader: R) -> io::Result<Ingested>
    where
        R: AsyncRead + Unpin,
    {
        let temp = self.temp_file().await?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(temp.path())
            .await?;

        let mut hasher = OidHasher::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut size = 0u64;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).await?;
            size += n as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(Ingested {
            oid: hasher.finish(),
            temp,
            size,
        })
    }

    /// Recompute the digest of the stored copy of `oid`
    pub async fn rehash(&self, oid: &Oid) -> io::Result<Oid> {
        let file = self.open(oid).await?;
        hash_reader(file).await
    }
}

/// Digest of everything `reader` yields
pub async fn hash_reader<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<Oid> {
    let mut hasher = OidHasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(hasher.finish());
        }
        hasher.update(&buf[..n]);
    }
}

/// Digest of a file on disk
pub async fn hash_file(path: &Path) -> io::Result<Oid> {
    hash_reader(fs::File::open(path).await?).await
}
