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
//! Reconciliation between the local store, the remote and the working tree

use crate::error::{SyncError, SyncResult};
use crate::progress::{Silent, SyncObserver};
use gitmedia_git::repo::is_pointer_file;
use gitmedia_git::TrackedMedia;
use gitmedia_storage::{ContentStore, Oid, Transport, TransportExt, TransportHandle};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A stored object and its size in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSize {
    pub oid: Oid,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct StatusReport {
    /// Stored locally, absent from the remote
    pub unpushed: Vec<ObjectSize>,
    /// Working copies that still hold a pointer
    pub unexpanded: Vec<TrackedMedia>,
    /// Referenced by a tracked path but not in the local store
    pub missing: Vec<Oid>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.unpushed.is_empty() && self.unexpanded.is_empty() && self.missing.is_empty()
    }

    pub fn unpushed_bytes(&self) -> u64 {
        self.unpushed.iter().map(|o| o.size).sum()
    }
}

#[derive(Debug, Default)]
pub struct PullReport {
    pub pulled: Vec<Oid>,
    /// Missing locally and on the remote
    pub unavailable: Vec<Oid>,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub pushed: Vec<Oid>,
    pub pulled: Vec<Oid>,
    pub unavailable: Vec<Oid>,
    pub expanded: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ClearReport {
    pub removed: Vec<Oid>,
    pub freed_bytes: u64,
    /// Objects kept because the remote does not have them
    pub kept: usize,
}

/// A stored object with the tracked paths that reference it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub oid: Oid,
    pub size: u64,
    pub paths: Vec<PathBuf>,
}

/// Runs status, sync, download, clear and list for one repository
///
/// Tracked media is passed in by the caller; the coordinator never reads
/// the index itself. The remote is only contacted by steps that need it.
pub struct SyncCoordinator {
    store: ContentStore,
    transport: TransportHandle,
    workdir: Option<PathBuf>,
    observer: Box<dyn SyncObserver>,
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("store", &self.store)
            .field("transport", &self.transport)
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl SyncCoordinator {
    pub fn new(store: ContentStore, transport: TransportHandle) -> Self {
        SyncCoordinator {
            store,
            transport,
            workdir: None,
            observer: Box::new(Silent),
        }
    }

    /// Working tree in which pointers get expanded
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn with_observer(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Compare the store against the remote and the working tree
    pub async fn status(&self, tracked: &[TrackedMedia]) -> SyncResult<StatusReport> {
        let local = self.store.list_all().await?;
        let transport = self.transport.get().await?;
        let unpushed_oids = transport.unpushed(&self.store, &local).await?;

        let mut unpushed = Vec::with_capacity(unpushed_oids.len());
        for oid in unpushed_oids {
            let size = self.store.size_of(&oid).await?;
            unpushed.push(ObjectSize { oid, size });
        }

        Ok(StatusReport {
            unpushed,
            unexpanded: self.unexpanded(tracked)?,
            missing: self.missing_locally(tracked).await,
        })
    }

    /// Upload every stored object the remote lacks
    pub async fn push(&self) -> SyncResult<Vec<Oid>> {
        let local = self.store.list_all().await?;
        if local.is_empty() {
            return Ok(Vec::new());
        }

        let transport = self.transport.get().await?;
        let unpushed = transport.unpushed(&self.store, &local).await?;

        self.observer.phase("push", unpushed.len());
        for oid in &unpushed {
            transport
                .push(&self.store, oid)
                .await
                .map_err(|e| SyncError::object("push", *oid, e))?;
            info!(%oid, "Uploaded media");
            self.observer.object(oid);
        }
        self.observer.finish();
        Ok(unpushed)
    }

    /// Fetch referenced objects that are not stored locally
    ///
    /// Objects the remote does not have either are reported, not fatal.
    pub async fn pull_missing(&self, tracked: &[TrackedMedia]) -> SyncResult<PullReport> {
        let missing = self.missing_locally(tracked).await;
        let mut report = PullReport::default();
        if missing.is_empty() {
            return Ok(report);
        }

        let transport = self.transport.get().await?;
        self.observer.phase("pull", missing.len());
        for oid in missing {
            let available = transport
                .exists(&oid)
                .await
                .map_err(|e| SyncError::object("pull", oid, e))?;
            if available {
                transport
                    .pull(&self.store, &oid)
                    .await
                    .map_err(|e| SyncError::object("pull", oid, e))?;
                info!(%oid, "Downloaded media");
                report.pulled.push(oid);
            } else {
                warn!(%oid, "Media is missing locally and on the remote");
                report.unavailable.push(oid);
            }
            self.observer.object(&oid);
        }
        self.observer.finish();
        Ok(report)
    }

    /// Replace working copies that still hold a pointer with stored content
    pub async fn expand(&self, tracked: &[TrackedMedia]) -> SyncResult<Vec<PathBuf>> {
        let Some(workdir) = &self.workdir else {
            return Ok(Vec::new());
        };

        let mut expanded = Vec::new();
        for media in self.unexpanded(tracked)? {
            if !self.store.contains(&media.oid).await {
                debug!(path = %media.path.display(), oid = %media.oid, "Not cached, leaving pointer");
                continue;
            }
            let dest = workdir.join(&media.path);
            replace_with(&self.store.object_path(&media.oid), &dest)
                .await
                .map_err(|source| SyncError::Expand {
                    path: media.path.clone(),
                    source,
                })?;
            debug!(path = %media.path.display(), "Expanded media");
            expanded.push(media.path);
        }
        Ok(expanded)
    }

    /// Push, pull and expand
    pub async fn sync(&self, tracked: &[TrackedMedia]) -> SyncResult<SyncReport> {
        let pushed = self.push().await?;
        let mut report = self.download(tracked).await?;
        report.pushed = pushed;
        Ok(report)
    }

    /// Pull and expand only
    pub async fn download(&self, tracked: &[TrackedMedia]) -> SyncResult<SyncReport> {
        let pull = self.pull_missing(tracked).await?;
        let expanded = self.expand(tracked).await?;
        Ok(SyncReport {
            pushed: Vec::new(),
            pulled: pull.pulled,
            unavailable: pull.unavailable,
            expanded,
        })
    }

    /// Delete local copies of objects the remote confirms it has
    pub async fn clear(&self) -> SyncResult<ClearReport> {
        let local = self.store.list_all().await?;
        let mut report = ClearReport::default();
        if local.is_empty() {
            return Ok(report);
        }

        let transport = self.transport.get().await?;
        let unpushed: HashSet<Oid> = transport
            .unpushed(&self.store, &local)
            .await?
            .into_iter()
            .collect();
        report.kept = unpushed.len();

        for oid in local.iter().filter(|oid| !unpushed.contains(oid)) {
            let size = self.store.size_of(oid).await.unwrap_or(0);
            if self.store.remove(oid).await? {
                debug!(%oid, size, "Removed pushed media");
                report.freed_bytes += size;
                report.removed.push(*oid);
            }
        }
        Ok(report)
    }

    /// Local objects with the tracked paths that reference them
    ///
    /// Needs no transport.
    pub async fn list(&self, tracked: &[TrackedMedia]) -> SyncResult<Vec<ListEntry>> {
        let mut paths: BTreeMap<Oid, Vec<PathBuf>> = BTreeMap::new();
        for media in tracked {
            paths.entry(media.oid).or_default().push(media.path.clone());
        }

        let mut entries = Vec::new();
        for oid in self.store.list_all().await? {
            entries.push(ListEntry {
                oid,
                size: self.store.size_of(&oid).await?,
                paths: paths.remove(&oid).unwrap_or_default(),
            });
        }
        Ok(entries)
    }

    /// Tracked oids absent from the store, each once, in first-seen order
    async fn missing_locally(&self, tracked: &[TrackedMedia]) -> Vec<Oid> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for media in tracked {
            if seen.insert(media.oid) && !self.store.contains(&media.oid).await {
                missing.push(media.oid);
            }
        }
        missing
    }

    fn unexpanded(&self, tracked: &[TrackedMedia]) -> SyncResult<Vec<TrackedMedia>> {
        let Some(workdir) = &self.workdir else {
            return Ok(Vec::new());
        };
        let mut pending = Vec::new();
        for media in tracked {
            if is_pointer_file(&workdir.join(&media.path), &media.oid)? {
                pending.push(media.clone());
            }
        }
        Ok(pending)
    }
}

/// Atomically overwrite `dest` with a copy of `src`, keeping `dest`'s mode
async fn replace_with(src: &Path, dest: &Path) -> io::Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::other("path has no parent directory"))?
        .to_path_buf();
    let temp = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".git-media-")
            .tempfile_in(parent)
            .map(|file| file.into_temp_path())
    })
    .await
    .map_err(io::Error::other)??;

    tokio::fs::copy(src, &temp).await?;
    let permissions = tokio::fs::metadata(dest).await?.permissions();
    tokio::fs::set_permissions(&temp, permissions).await?;
    temp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
