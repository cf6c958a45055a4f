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
//! Per-invocation repository and settings

use anyhow::{Context, Result};
use gitmedia_config::{ConfigLoader, MediaConfig};
use gitmedia_git::{MediaRepo, TrackedMedia};
use gitmedia_storage::{ContentStore, TransportHandle};
use gitmedia_sync::{IntegrityChecker, SyncCoordinator};
use tracing::debug;

/// The repository git-media was started in and its resolved settings
pub struct Session {
    pub repo: MediaRepo,
    pub config: MediaConfig,
}

impl Session {
    /// Open the current repository and resolve `git-media.*` settings
    pub fn open() -> Result<Self> {
        let repo = open_repo()?;
        let config = repo
            .load_config(&ConfigLoader::new())
            .context("Invalid git-media configuration")?;
        debug!(
            git_dir = %repo.git_dir().display(),
            transport = %config.transport.as_ref().map(|t| t.describe()).unwrap_or_default(),
            filter_sync = config.filter_sync,
            "Resolved configuration"
        );
        Ok(Session { repo, config })
    }

    pub fn store(&self) -> ContentStore {
        self.repo.store()
    }

    pub fn transport(&self) -> TransportHandle {
        TransportHandle::new(&self.config)
    }

    pub fn tracked(&self) -> Result<Vec<TrackedMedia>> {
        self.repo
            .tracked_media()
            .context("Failed to scan the index for media pointers")
    }

    pub fn coordinator(&self) -> SyncCoordinator {
        let coordinator = SyncCoordinator::new(self.store(), self.transport());
        match self.repo.workdir() {
            Ok(workdir) => coordinator.with_workdir(workdir),
            Err(_) => coordinator,
        }
    }

    pub fn checker(&self) -> IntegrityChecker {
        IntegrityChecker::new(self.store(), self.transport())
    }
}

/// The repository git would use from the current directory
pub fn open_repo() -> Result<MediaRepo> {
    MediaRepo::from_env().context("git-media must be run inside a git repository")
}
