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
//! Test repository management

use crate::cli::{git_media, path_with_git_media};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git repository in a temporary directory
///
/// Commands run with an isolated git configuration: no system or global
/// config is read, so the host's settings cannot leak into tests.
///
/// # Example
/// ```ignore
/// use gitmedia_test_utils::TestRepo;
///
/// let repo = TestRepo::with_media();
/// repo.write_file("clip.bin", b"frames");
/// repo.git(&["add", "clip.bin"]);
/// repo.git(&["commit", "-m", "Add clip"]);
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
    remote_dir: TempDir,
}

impl TestRepo {
    /// An initialized git repository without the media filter
    pub fn new() -> Self {
        let repo = Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            remote_dir: TempDir::new().expect("Failed to create remote directory"),
        };
        repo.git(&["init", "-q"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Repository with the filter installed, `*.bin` tracked and a local remote
    pub fn with_media() -> Self {
        let repo = Self::new();
        repo.use_local_remote();
        repo.git_media(&["install"]);
        repo.git_media(&["track", "*.bin"]);
        repo
    }

    /// Point `git-media.transport` at this repository's remote directory
    pub fn use_local_remote(&self) {
        let remote = self.remote_path().display().to_string();
        self.git(&["config", "git-media.transport", "local"]);
        self.git(&["config", "git-media.localpath", &remote]);
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path().join(".git")
    }

    /// Directory serving as the `local` transport remote
    pub fn remote_path(&self) -> &Path {
        self.remote_dir.path()
    }

    /// Where the store keeps the object with hex digest `oid`
    pub fn object_path(&self, oid: &str) -> PathBuf {
        self.git_dir()
            .join("media/objects")
            .join(&oid[..2])
            .join(oid)
    }

    /// Where the local remote keeps the object with hex digest `oid`
    pub fn remote_object_path(&self, oid: &str) -> PathBuf {
        self.remote_path().join(oid)
    }

    pub fn write_file(&self, name: &str, content: &[u8]) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    pub fn read_file(&self, name: &str) -> Vec<u8> {
        fs::read(self.path().join(name)).expect("Failed to read file")
    }

    pub fn delete_file(&self, name: &str) {
        fs::remove_file(self.path().join(name)).expect("Failed to delete file");
    }

    /// A `git` command in this repository with `git-media` on `PATH`
    pub fn git_command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(self.path())
            .env("PATH", path_with_git_media())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", self.path().join(".no-global-config"))
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        cmd
    }

    /// Run git and panic with its stderr on failure
    pub fn git(&self, args: &[&str]) -> Output {
        let output = self
            .git_command(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    /// A `git-media` command in this repository
    pub fn git_media_command(&self) -> assert_cmd::Command {
        let mut cmd = git_media();
        cmd.current_dir(self.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", self.path().join(".no-global-config"))
            .env_remove("GIT_DIR")
            .env_remove("GIT_MEDIA_TRANSPORT");
        cmd
    }

    /// Run git-media and assert success
    pub fn git_media(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.git_media_command().args(args).assert().success()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
