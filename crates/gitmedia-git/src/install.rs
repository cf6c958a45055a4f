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
//! Filter registration and `.gitattributes` tracking
//!
//! ```text
//! [filter "media"]
//!     clean = git-media filter-clean %f
//!     smudge = git-media filter-smudge %f
//!     required = true
//! ```
//!
//! Paths are routed through the filter by `.gitattributes` lines of the form
//! `*.mov filter=media -crlf`.

use crate::error::{GitError, GitResult};
use crate::repo::MediaRepo;
use git2::{ConfigLevel, ErrorCode};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Filter driver name used in git configuration and attributes
pub const FILTER_NAME: &str = "media";

pub const CLEAN_COMMAND: &str = "git-media filter-clean %f";
pub const SMUDGE_COMMAND: &str = "git-media filter-smudge %f";

const ATTRIBUTES_FILE: &str = ".gitattributes";

fn key(name: &str) -> String {
    format!("filter.{}.{}", FILTER_NAME, name)
}

/// Register the clean/smudge filter in the repository's local config
///
/// An existing registration pointing at other commands is left alone
/// unless `force` is set.
pub fn install(repo: &MediaRepo, force: bool) -> GitResult<()> {
    let current = repo.repository().config()?.snapshot()?;
    for (name, command) in [("clean", CLEAN_COMMAND), ("smudge", SMUDGE_COMMAND)] {
        match current.get_string(&key(name)) {
            Ok(existing) if existing != command && !force => {
                return Err(GitError::AlreadyInstalled(existing));
            }
            Ok(_) => {}
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut config = repo.repository().config()?.open_level(ConfigLevel::Local)?;
    config.set_str(&key("clean"), CLEAN_COMMAND)?;
    config.set_str(&key("smudge"), SMUDGE_COMMAND)?;
    config.set_bool(&key("required"), true)?;

    info!(git_dir = %repo.git_dir().display(), "Installed media filter");
    Ok(())
}

/// Remove the filter registration; returns whether anything was removed
pub fn uninstall(repo: &MediaRepo) -> GitResult<bool> {
    let mut config = repo.repository().config()?.open_level(ConfigLevel::Local)?;
    let mut removed = false;
    for name in ["clean", "smudge", "required"] {
        match config.remove(&key(name)) {
            Ok(()) => removed = true,
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    if removed {
        info!(git_dir = %repo.git_dir().display(), "Removed media filter");
    }
    Ok(removed)
}

/// Whether the filter is registered with this tool's commands
pub fn is_installed(repo: &MediaRepo) -> GitResult<bool> {
    let config = repo.repository().config()?.snapshot()?;
    let matches = |name: &str, command: &str| match config.get_string(&key(name)) {
        Ok(value) => Ok(value == command),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
        Err(e) => Err(GitError::from(e)),
    };
    Ok(matches("clean", CLEAN_COMMAND)? && matches("smudge", SMUDGE_COMMAND)?)
}

fn attribute_line(pattern: &str) -> String {
    format!("{} filter={} -crlf", pattern, FILTER_NAME)
}

/// Whether an attributes line routes `pattern` (or any pattern) through the filter
fn routes_pattern(line: &str, pattern: Option<&str>) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return false;
    };
    if first.starts_with('#') || pattern.is_some_and(|p| p != first) {
        return false;
    }
    let filter = format!("filter={}", FILTER_NAME);
    tokens.any(|t| t == filter)
}

fn check_pattern(pattern: &str) -> GitResult<()> {
    if pattern.is_empty() || pattern.chars().any(char::is_whitespace) {
        return Err(GitError::GitattributesConfig(format!(
            "invalid pattern '{}'",
            pattern
        )));
    }
    Ok(())
}

fn read_attributes(path: &Path) -> GitResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(GitError::GitattributesConfig(e.to_string())),
    }
}

/// Route `pattern` through the filter; returns false if it already was
pub fn track_pattern(workdir: &Path, pattern: &str) -> GitResult<bool> {
    check_pattern(pattern)?;
    let path = workdir.join(ATTRIBUTES_FILE);
    let mut content = read_attributes(&path)?;

    if content.lines().any(|line| routes_pattern(line, Some(pattern))) {
        debug!(pattern, "Pattern already tracked");
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&attribute_line(pattern));
    content.push('\n');

    fs::write(&path, content).map_err(|e| GitError::GitattributesConfig(e.to_string()))?;
    info!(pattern, "Tracking pattern");
    Ok(true)
}

/// Stop routing `pattern` through the filter; returns false if it was not
pub fn untrack_pattern(workdir: &Path, pattern: &str) -> GitResult<bool> {
    check_pattern(pattern)?;
    let path = workdir.join(ATTRIBUTES_FILE);
    let content = read_attributes(&path)?;

    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !routes_pattern(line, Some(pattern)))
        .collect();
    if kept.len() == content.lines().count() {
        debug!(pattern, "Pattern was not tracked");
        return Ok(false);
    }

    let mut updated = kept.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    fs::write(&path, updated).map_err(|e| GitError::GitattributesConfig(e.to_string()))?;
    info!(pattern, "Untracked pattern");
    Ok(true)
}

/// Patterns currently routed through the filter
pub fn tracked_patterns(workdir: &Path) -> GitResult<Vec<String>> {
    let content = read_attributes(&workdir.join(ATTRIBUTES_FILE))?;
    Ok(content
        .lines()
        .filter(|line| routes_pattern(line, None))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}
