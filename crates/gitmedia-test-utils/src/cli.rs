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
//! CLI command helpers

use assert_cmd::Command;
use std::ffi::OsString;
use std::path::PathBuf;

/// Command for the `git-media` binary built by cargo
///
/// # Example
/// ```ignore
/// use gitmedia_test_utils::git_media;
///
/// git_media().arg("version").assert().success();
/// ```
#[allow(deprecated)] // cargo_bin is deprecated but still works for our use case
pub fn git_media() -> Command {
    Command::cargo_bin("git-media").expect("git-media binary not found")
}

/// Location of the built `git-media` binary
#[allow(deprecated)]
pub fn git_media_path() -> PathBuf {
    assert_cmd::cargo::cargo_bin("git-media")
}

/// `PATH` with the binary's directory first, so git can run the filter
pub fn path_with_git_media() -> OsString {
    let bin_dir = git_media_path()
        .parent()
        .expect("binary has a parent directory")
        .to_path_buf();
    let mut dirs = vec![bin_dir];
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(dirs).expect("PATH entries are joinable")
}
