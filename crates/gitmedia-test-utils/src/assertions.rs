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
//! Custom assertions for common test patterns

use crate::repo::TestRepo;

/// Hex SHA-1 pointer record of `content`, as `git-media` writes it
///
/// The content is cached locally without being pushed.
pub fn pointer_for(repo: &TestRepo, content: &[u8]) -> String {
    let output = repo
        .git_media_command()
        .env("GIT_MEDIA_FILTERSYNC", "false")
        .arg("filter-clean")
        .write_stdin(content.to_vec())
        .output()
        .expect("Failed to run filter-clean");
    assert!(output.status.success(), "filter-clean failed");
    String::from_utf8(output.stdout).expect("pointer is ASCII")
}

/// Assert the store holds `oid` with exactly `content`
pub fn assert_cached(repo: &TestRepo, oid: &str, content: &[u8]) {
    let path = repo.object_path(oid);
    let stored = std::fs::read(&path)
        .unwrap_or_else(|e| panic!("object {} should be cached at {:?}: {}", oid, path, e));
    assert_eq!(stored, content, "cached object {} has unexpected content", oid);
}

pub fn assert_not_cached(repo: &TestRepo, oid: &str) {
    assert!(
        !repo.object_path(oid).exists(),
        "object {} should not be cached",
        oid
    );
}

/// Assert the local remote holds `oid`
pub fn assert_on_remote(repo: &TestRepo, oid: &str) {
    assert!(
        repo.remote_object_path(oid).is_file(),
        "object {} should be on the remote",
        oid
    );
}
