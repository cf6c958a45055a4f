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
//! Repository access
//!
//! Locates the git directory (and with it the media store), exposes git
//! config as a [`ConfigSource`], and finds media tracked in the index.

use crate::error::{GitError, GitResult};
use crate::pointer::{Pointer, POINTER_LEN};
use git2::{ErrorCode, ObjectType, Repository};
use gitmedia_config::{ConfigError, ConfigLoader, ConfigResult, ConfigSource, EnvOverlay, MediaConfig};
use gitmedia_storage::{ContentStore, Oid};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File type bits of a regular blob in index entry modes
const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_REGULAR: u32 = 0o100000;

/// A path whose staged content is a media pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMedia {
    /// Path relative to the working tree root
    pub path: PathBuf,
    pub oid: Oid,
}

/// An opened git repository
pub struct MediaRepo {
    repo: Repository,
}

impl std::fmt::Debug for MediaRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaRepo")
            .field("git_dir", &self.repo.path())
            .finish()
    }
}

impl MediaRepo {
    /// Find the repository containing `path`
    pub fn discover(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            GitError::RepositoryNotFound(format!("{}: {}", path.display(), e.message()))
        })?;
        Ok(MediaRepo { repo })
    }

    /// Open the repository git would use from here, honoring `GIT_DIR`
    pub fn from_env() -> GitResult<Self> {
        let repo = Repository::open_from_env()
            .map_err(|e| GitError::RepositoryNotFound(e.message().to_string()))?;
        Ok(MediaRepo { repo })
    }

    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Working tree root
    pub fn workdir(&self) -> GitResult<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(self.git_dir().display().to_string()))
    }

    /// Media store under this repository's git directory
    pub fn store(&self) -> ContentStore {
        ContentStore::for_git_dir(self.git_dir())
    }

    /// Snapshot of the repository's git config
    pub fn config_source(&self) -> GitResult<GitConfigSource> {
        let config = self.repo.config()?.snapshot()?;
        Ok(GitConfigSource { config })
    }

    /// Resolve settings from git config with environment overrides applied
    pub fn load_config(&self, loader: &ConfigLoader) -> GitResult<MediaConfig> {
        let source = EnvOverlay::from_env(self.config_source()?);
        Ok(loader.resolve(&source)?)
    }

    /// Every index entry whose blob is a pointer record, in index order
    pub fn tracked_media(&self) -> GitResult<Vec<TrackedMedia>> {
        let index = self.repo.index()?;
        let odb = self.repo.odb()?;
        let mut tracked = Vec::new();

        for entry in index.iter() {
            if entry.mode & MODE_TYPE_MASK != MODE_REGULAR {
                continue;
            }
            let (size, kind) = match odb.read_header(entry.id) {
                Ok(header) => header,
                Err(e) => {
                    warn!(id = %entry.id, "Cannot read index blob: {}", e.message());
                    continue;
                }
            };
            if kind != ObjectType::Blob || size != POINTER_LEN {
                continue;
            }

            let blob = self.repo.find_blob(entry.id)?;
            if let Some(pointer) = Pointer::parse(blob.content()) {
                let path = PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned());
                debug!(path = %path.display(), oid = %pointer.oid, "Found tracked media");
                tracked.push(TrackedMedia {
                    path,
                    oid: pointer.oid,
                });
            }
        }

        Ok(tracked)
    }

    /// Underlying libgit2 handle
    pub fn repository(&self) -> &Repository {
        &self.repo
    }
}

/// Whether the file at `path` is exactly the pointer for `oid`
///
/// Missing files count as not expanded-able and return false.
pub fn is_pointer_file(path: &Path, oid: &Oid) -> GitResult<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() || meta.len() != POINTER_LEN as u64 {
        return Ok(false);
    }

    let mut buf = Vec::with_capacity(POINTER_LEN);
    fs::File::open(path)?.read_to_end(&mut buf)?;
    Ok(Pointer::parse(&buf).is_some_and(|p| p.oid == *oid))
}

/// Git config as a key/value source
pub struct GitConfigSource {
    config: git2::Config,
}

impl std::fmt::Debug for GitConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GitConfigSource")
    }
}

impl ConfigSource for GitConfigSource {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ConfigError::source(key, e.message())),
        }
    }
}
