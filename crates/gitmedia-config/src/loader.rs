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
//! Resolution of settings from git config and the environment

use crate::error::{ConfigError, ConfigResult};
use crate::netrc::{host_of, Netrc};
use crate::schema::*;
use crate::source::ConfigSource;
use crate::validation::Validator;
use std::path::PathBuf;

/// Resolves a [`MediaConfig`] from a key/value source
///
/// Resolution happens once per invocation. Missing required keys are
/// reported before any filesystem or network activity.
#[derive(Debug)]
pub struct ConfigLoader {
    netrc: NetrcLookup,
}

#[derive(Debug)]
enum NetrcLookup {
    /// `$NETRC` or `~/.netrc`, read only when WebDAV credentials are missing
    Default,
    Fixed(Option<Netrc>),
}

impl ConfigLoader {
    /// Loader that reads the user's netrc on demand
    pub fn new() -> Self {
        ConfigLoader {
            netrc: NetrcLookup::Default,
        }
    }

    /// Use the given netrc contents instead of reading the user's file
    pub fn with_netrc(mut self, netrc: Option<Netrc>) -> Self {
        self.netrc = NetrcLookup::Fixed(netrc);
        self
    }

    /// Resolve every setting, including the transport if one is selected
    pub fn resolve(&self, source: &dyn ConfigSource) -> ConfigResult<MediaConfig> {
        let filter_sync = get(source, "git-media.filtersync")?.as_deref() != Some("false");

        let retries = match get(source, "git-media.retries")? {
            Some(value) => value.trim().parse::<u32>().map_err(|_| {
                ConfigError::invalid_value(
                    "git-media.retries",
                    format!("expected a non-negative integer, got '{}'", value),
                )
            })?,
            None => DEFAULT_RETRIES,
        };

        let transport = match get(source, "git-media.transport")? {
            Some(kind) => Some(self.resolve_transport(kind.parse()?, source)?),
            None => None,
        };

        Ok(MediaConfig {
            transport,
            filter_sync,
            retries,
        })
    }

    /// Resolve the configuration of one backend kind
    pub fn resolve_transport(
        &self,
        kind: TransportKind,
        source: &dyn ConfigSource,
    ) -> ConfigResult<TransportConfig> {
        let name = kind.name();
        let config = match kind {
            TransportKind::Local => TransportConfig::Local(LocalConfig {
                path: PathBuf::from(require(source, "git-media.localpath", name)?),
            }),
            TransportKind::Scp => TransportConfig::Scp(ScpConfig {
                user: require(source, "git-media.scpuser", name)?,
                host: require(source, "git-media.scphost", name)?,
                path: require(source, "git-media.scppath", name)?,
                port: get(source, "git-media.scpport")?
                    .map(|port| parse_port("git-media.scpport", &port))
                    .transpose()?,
            }),
            TransportKind::S3 => TransportConfig::S3(S3Config {
                bucket: require(source, "git-media.s3bucket", name)?,
                access_key: require(source, "git-media.s3key", name)?,
                secret_key: require(source, "git-media.s3secret", name)?,
                region: get(source, "git-media.s3region")?
                    .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            }),
            TransportKind::Atmos => TransportConfig::Atmos(AtmosConfig {
                endpoint: require(source, "git-media.endpoint", name)?,
                uid: require(source, "git-media.uid", name)?,
                secret: require(source, "git-media.secret", name)?,
                tag: get(source, "git-media.tag")?,
            }),
            TransportKind::Drive => TransportConfig::Drive(DriveConfig {
                email: require(source, "git-media.email", name)?,
                app_password: require(source, "git-media.asp", name)?,
                collection: require(source, "git-media.collection", name)?,
            }),
            TransportKind::HashStash => TransportConfig::HashStash(HashStashConfig {
                host: require(source, "git-media.host", name)?,
                port: parse_port("git-media.port", &require(source, "git-media.port", name)?)?,
                origin: require(source, "remote.origin.url", name)?,
            }),
            TransportKind::WebDav => self.resolve_webdav(source)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn resolve_webdav(&self, source: &dyn ConfigSource) -> ConfigResult<TransportConfig> {
        let name = TransportKind::WebDav.name();
        let url = require(source, "git-media.webdavurl", name)?;
        let mut user = get(source, "git-media.webdavuser")?;
        let mut password = get(source, "git-media.webdavpassword")?;

        if user.is_none() {
            let host = host_of(&url).ok_or_else(|| {
                ConfigError::invalid_value(
                    "git-media.webdavurl",
                    "cannot identify a hostname in the URL",
                )
            })?;
            let netrc = self.load_netrc()?;
            let entry = netrc.as_ref().and_then(|n| n.machine(host));
            tracing::debug!(host, found = entry.is_some(), "Looking up WebDAV credentials in netrc");
            user = entry.and_then(|e| e.login.clone());
            password = entry.and_then(|e| e.password.clone());
        }

        Ok(TransportConfig::WebDav(WebDavConfig {
            url,
            user: user.ok_or_else(|| ConfigError::missing("git-media.webdavuser", name))?,
            password: password
                .ok_or_else(|| ConfigError::missing("git-media.webdavpassword", name))?,
            verify_server: get(source, "git-media.webdavverifyserver")?.as_deref() == Some("true"),
            binary_transfer: get(source, "git-media.webdavbinarytransfer")?.as_deref()
                == Some("true"),
        }))
    }

    fn load_netrc(&self) -> ConfigResult<Option<Netrc>> {
        match &self.netrc {
            NetrcLookup::Default => Netrc::load(),
            NetrcLookup::Fixed(netrc) => Ok(netrc.clone()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed value, with empty strings treated as unset
fn get(source: &dyn ConfigSource, key: &str) -> ConfigResult<Option<String>> {
    Ok(source
        .get(key)?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn require(source: &dyn ConfigSource, key: &str, kind: &'static str) -> ConfigResult<String> {
    get(source, key)?.ok_or_else(|| ConfigError::missing(key, kind))
}

fn parse_port(key: &str, value: &str) -> ConfigResult<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::invalid_value(
            key,
            format!("port must be between 1 and 65535, got '{}'", value),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::MapSource;

    fn resolve(source: &MapSource) -> ConfigResult<MediaConfig> {
        ConfigLoader::new().with_netrc(None).resolve(source)
    }

    #[test]
    fn test_unset_transport() {
        let config = resolve(&MapSource::new()).unwrap();
        assert!(config.transport.is_none());
        assert!(config.filter_sync);
        assert_eq!(config.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn test_filtersync_only_disabled_by_false() {
        let source = MapSource::new().with("git-media.filtersync", "false");
        assert!(!resolve(&source).unwrap().filter_sync);

        let source = MapSource::new().with("git-media.filtersync", "no");
        assert!(resolve(&source).unwrap().filter_sync);
    }

    #[test]
    fn test_local_transport() {
        let source = MapSource::new()
            .with("git-media.transport", "local")
            .with("git-media.localpath", "/srv/media\n");
        let config = resolve(&source).unwrap();
        assert_eq!(
            config.transport,
            Some(TransportConfig::Local(LocalConfig {
                path: PathBuf::from("/srv/media")
            }))
        );
    }

    #[test]
    fn test_missing_key_named() {
        let source = MapSource::new()
            .with("git-media.transport", "scp")
            .with("git-media.scpuser", "media")
            .with("git-media.scppath", "/srv/media");
        let err = resolve(&source).unwrap_err();
        assert_eq!(err.to_string(), "git-media.scphost not set for scp transport");
    }

    #[test]
    fn test_unknown_transport() {
        let source = MapSource::new().with("git-media.transport", "ftp");
        assert!(matches!(
            resolve(&source),
            Err(ConfigError::UnknownTransport(kind)) if kind == "ftp"
        ));
    }

    #[test]
    fn test_scp_port_and_s3_region() {
        let source = MapSource::new()
            .with("git-media.transport", "scp")
            .with("git-media.scpuser", "media")
            .with("git-media.scphost", "files.example.com")
            .with("git-media.scppath", "/srv/media")
            .with("git-media.scpport", "2222");
        match resolve(&source).unwrap().transport.unwrap() {
            TransportConfig::Scp(scp) => assert_eq!(scp.port, Some(2222)),
            other => panic!("unexpected transport {:?}", other),
        }

        let source = MapSource::new()
            .with("git-media.transport", "s3")
            .with("git-media.s3bucket", "media-bucket")
            .with("git-media.s3key", "key")
            .with("git-media.s3secret", "secret");
        match resolve(&source).unwrap().transport.unwrap() {
            TransportConfig::S3(s3) => assert_eq!(s3.region, DEFAULT_S3_REGION),
            other => panic!("unexpected transport {:?}", other),
        }
    }

    #[test]
    fn test_invalid_port() {
        let source = MapSource::new()
            .with("git-media.transport", "hashstash")
            .with("git-media.host", "cache.example.com")
            .with("git-media.port", "99999")
            .with("remote.origin.url", "git@example.com:repo.git");
        assert!(matches!(
            resolve(&source),
            Err(ConfigError::InvalidValue { field, .. }) if field == "git-media.port"
        ));
    }

    #[test]
    fn test_webdav_netrc_fallback() {
        let source = MapSource::new()
            .with("git-media.transport", "webdav")
            .with("git-media.webdavurl", "https://dav.example.com/media")
            .with("git-media.webdavverifyserver", "true");

        let netrc = Netrc::parse("machine dav.example.com login alice password s3cret");
        let config = ConfigLoader::new()
            .with_netrc(Some(netrc))
            .resolve(&source)
            .unwrap();
        match config.transport.unwrap() {
            TransportConfig::WebDav(dav) => {
                assert_eq!(dav.user, "alice");
                assert_eq!(dav.password, "s3cret");
                assert!(dav.verify_server);
                assert!(!dav.binary_transfer);
            }
            other => panic!("unexpected transport {:?}", other),
        }

        let err = resolve(&source).unwrap_err();
        assert_eq!(err.to_string(), "git-media.webdavuser not set for webdav transport");
    }

    #[test]
    fn test_invalid_retries() {
        let source = MapSource::new().with("git-media.retries", "many");
        assert!(matches!(
            resolve(&source),
            Err(ConfigError::InvalidValue { field, .. }) if field == "git-media.retries"
        ));

        let source = MapSource::new().with("git-media.retries", "0");
        assert_eq!(resolve(&source).unwrap().retries, 0);
    }
}
