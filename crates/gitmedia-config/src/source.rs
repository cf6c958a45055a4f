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
//! Key/value configuration sources
//!
//! git-media settings live in git config under the `git-media.` section. The
//! loader only needs point lookups, so a source is anything that can answer
//! `get("git-media.localpath")`. The git-backed source lives in the
//! `gitmedia-git` crate; this module provides the environment overlay and an
//! in-memory map used by tests.

use crate::error::ConfigResult;
use std::collections::HashMap;

/// Prefix of environment variables that override git config keys
pub const ENV_PREFIX: &str = "GIT_MEDIA_";

/// Point lookup of configuration keys such as `git-media.transport`
///
/// Implementations return `Ok(None)` for unset keys. An empty value is
/// treated as unset by the loader.
pub trait ConfigSource {
    /// Raw value of `key`, `None` when unset
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        (**self).get(key)
    }
}

/// In-memory source
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`MapSource::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MapSource {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }
}

/// Environment variable name overriding a `git-media.*` key
///
/// `git-media.localpath` becomes `GIT_MEDIA_LOCALPATH`. Keys outside the
/// `git-media` section (e.g. `remote.origin.url`) have no override.
pub fn env_var_for(key: &str) -> Option<String> {
    let name = key.strip_prefix("git-media.")?;
    let suffix: String = name
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    Some(format!("{}{}", ENV_PREFIX, suffix))
}

/// Layers `GIT_MEDIA_*` environment variables over another source
#[derive(Debug, Clone)]
pub struct EnvOverlay<S> {
    inner: S,
    vars: HashMap<String, String>,
}

impl<S: ConfigSource> EnvOverlay<S> {
    /// Snapshot the process environment
    pub fn from_env(inner: S) -> Self {
        Self::with_vars(inner, std::env::vars())
    }

    /// Use an explicit set of variables instead of the process environment
    pub fn with_vars<I, K, V>(inner: S, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        EnvOverlay { inner, vars }
    }
}

impl<S: ConfigSource> ConfigSource for EnvOverlay<S> {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        if let Some(var) = env_var_for(key) {
            if let Some(value) = self.vars.get(&var) {
                tracing::debug!(key, var = %var, "Configuration overridden from environment");
                return Ok(Some(value.clone()));
            }
        }
        self.inner.get(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_names() {
        assert_eq!(env_var_for("git-media.transport").unwrap(), "GIT_MEDIA_TRANSPORT");
        assert_eq!(env_var_for("git-media.s3-region").unwrap(), "GIT_MEDIA_S3_REGION");
        assert!(env_var_for("remote.origin.url").is_none());
    }

    #[test]
    fn test_overlay_precedence() {
        let git = MapSource::new()
            .with("git-media.transport", "scp")
            .with("git-media.localpath", "/from/git")
            .with("remote.origin.url", "git@example.com:repo.git");

        let overlay = EnvOverlay::with_vars(
            git,
            [
                ("GIT_MEDIA_TRANSPORT", "local"),
                ("HOME", "/home/nobody"),
            ],
        );

        assert_eq!(overlay.get("git-media.transport").unwrap().unwrap(), "local");
        assert_eq!(overlay.get("git-media.localpath").unwrap().unwrap(), "/from/git");
        assert_eq!(
            overlay.get("remote.origin.url").unwrap().unwrap(),
            "git@example.com:repo.git"
        );
        assert!(overlay.get("git-media.scpuser").unwrap().is_none());
    }
}
