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
//! Minimal `.netrc` reader used as a credential fallback for WebDAV

use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Credentials for one `machine` entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetrcEntry {
    /// `login` token
    pub login: Option<String>,
    /// `password` token
    pub password: Option<String>,
}

/// Parsed netrc file
#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: Vec<(String, NetrcEntry)>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    /// Parse netrc text. Unknown tokens (`account`, `macdef` bodies) are ignored.
    pub fn parse(content: &str) -> Self {
        let mut netrc = Netrc::default();
        let mut tokens = content.split_whitespace();
        // (machine name, entry); `None` name is the `default` entry
        let mut current: Option<(Option<String>, NetrcEntry)> = None;

        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    netrc.finish(current.take());
                    if let Some(name) = tokens.next() {
                        current = Some((Some(name.to_string()), NetrcEntry::default()));
                    }
                }
                "default" => {
                    netrc.finish(current.take());
                    current = Some((None, NetrcEntry::default()));
                }
                "login" => {
                    let value = tokens.next().map(str::to_string);
                    if let Some((_, entry)) = current.as_mut() {
                        entry.login = value;
                    }
                }
                "password" => {
                    let value = tokens.next().map(str::to_string);
                    if let Some((_, entry)) = current.as_mut() {
                        entry.password = value;
                    }
                }
                "account" => {
                    tokens.next();
                }
                _ => {}
            }
        }
        netrc.finish(current);
        netrc
    }

    fn finish(&mut self, entry: Option<(Option<String>, NetrcEntry)>) {
        match entry {
            Some((Some(name), entry)) => self.machines.push((name, entry)),
            Some((None, entry)) => self.default = Some(entry),
            None => {}
        }
    }

    /// Load `$NETRC`, falling back to `~/.netrc`; `Ok(None)` when absent
    pub fn load() -> ConfigResult<Option<Self>> {
        match default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load a specific file; `Ok(None)` when it does not exist
    pub fn load_from(path: &Path) -> ConfigResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Credentials {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Entry for `host`, or the `default` entry
    pub fn machine(&self, host: &str) -> Option<&NetrcEntry> {
        self.machines
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(host))
            .map(|(_, entry)| entry)
            .or(self.default.as_ref())
    }
}

fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("NETRC") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".netrc"))
}

/// Host part of an URL such as `https://user@dav.example.com:8443/media`
pub fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map(|(_, rest)| rest)?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split(']').next()?
    } else {
        host_port.split(':').next()?
    };
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "machine dav.example.com\n  login alice\n  password s3cret\n\
                          machine other.example.com login bob password pw account x\n\
                          default login anonymous password guest\n";

    #[test]
    fn test_parse_machines() {
        let netrc = Netrc::parse(SAMPLE);
        let entry = netrc.machine("dav.example.com").unwrap();
        assert_eq!(entry.login.as_deref(), Some("alice"));
        assert_eq!(entry.password.as_deref(), Some("s3cret"));

        let entry = netrc.machine("OTHER.example.com").unwrap();
        assert_eq!(entry.login.as_deref(), Some("bob"));
        assert_eq!(entry.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_default_entry() {
        let netrc = Netrc::parse(SAMPLE);
        let entry = netrc.machine("unknown.example.com").unwrap();
        assert_eq!(entry.login.as_deref(), Some("anonymous"));

        let netrc = Netrc::parse("machine a login b password c");
        assert!(netrc.machine("z").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(Netrc::load_from(&temp.path().join("absent")).unwrap().is_none());

        let path = temp.path().join("netrc");
        std::fs::write(&path, SAMPLE).unwrap();
        assert!(Netrc::load_from(&path).unwrap().is_some());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://dav.example.com/media"), Some("dav.example.com"));
        assert_eq!(host_of("http://u:p@dav.example.com:8080/x"), Some("dav.example.com"));
        assert_eq!(host_of("https://[::1]:8443/"), Some("::1"));
        assert_eq!(host_of("dav.example.com/media"), None);
        assert_eq!(host_of("https:///media"), None);
    }
}
