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
//! Resolved settings and per-backend transport configuration

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default number of retries after a transport call fails to reach the remote
pub const DEFAULT_RETRIES: u32 = 2;

/// Default S3 region when `git-media.s3region` is unset
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Settings resolved once per invocation
///
/// Built by [`ConfigLoader`](crate::ConfigLoader) at process start and passed
/// by reference to every component; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConfig {
    /// Selected remote blob store, `None` when `git-media.transport` is unset
    pub transport: Option<TransportConfig>,

    /// Push new objects from the clean filter (`git-media.filtersync`)
    pub filter_sync: bool,

    /// Retries after the first attempt for unreachable transports (`git-media.retries`)
    pub retries: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            transport: None,
            filter_sync: true,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl MediaConfig {
    /// The configured transport, or [`ConfigError::NotConfigured`]
    pub fn require_transport(&self) -> ConfigResult<&TransportConfig> {
        self.transport.as_ref().ok_or(ConfigError::NotConfigured)
    }
}

/// Backend kind named by `git-media.transport`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Directory on a local or mounted filesystem
    Local,
    /// Remote directory reached over ssh/scp
    Scp,
    /// S3 bucket
    S3,
    /// EMC Atmos namespace
    Atmos,
    /// Drive-style document collection
    Drive,
    /// hashstash cache server
    #[serde(alias = "hash-stash")]
    HashStash,
    /// WebDAV collection
    WebDav,
}

impl TransportKind {
    /// Every supported kind
    pub const ALL: [TransportKind; 7] = [
        TransportKind::Local,
        TransportKind::Scp,
        TransportKind::S3,
        TransportKind::Atmos,
        TransportKind::Drive,
        TransportKind::HashStash,
        TransportKind::WebDav,
    ];

    /// Value accepted by `git-media.transport`
    pub fn name(&self) -> &'static str {
        match self {
            TransportKind::Local => "local",
            TransportKind::Scp => "scp",
            TransportKind::S3 => "s3",
            TransportKind::Atmos => "atmos",
            TransportKind::Drive => "drive",
            TransportKind::HashStash => "hashstash",
            TransportKind::WebDav => "webdav",
        }
    }
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim() {
            "local" => Ok(TransportKind::Local),
            "scp" => Ok(TransportKind::Scp),
            "s3" => Ok(TransportKind::S3),
            "atmos" => Ok(TransportKind::Atmos),
            "drive" => Ok(TransportKind::Drive),
            "hashstash" | "hash-stash" => Ok(TransportKind::HashStash),
            "webdav" => Ok(TransportKind::WebDav),
            "" => Err(ConfigError::NotConfigured),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remote blob store configuration, one variant per backend kind
///
/// Secrets are never serialized, so the JSON form is safe to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum TransportConfig {
    /// `local` backend
    Local(LocalConfig),
    /// `scp` backend
    Scp(ScpConfig),
    /// `s3` backend
    S3(S3Config),
    /// `atmos` backend
    Atmos(AtmosConfig),
    /// `drive` backend
    Drive(DriveConfig),
    /// `hashstash` backend
    #[serde(alias = "hash-stash")]
    HashStash(HashStashConfig),
    /// `webdav` backend
    WebDav(WebDavConfig),
}

impl TransportConfig {
    /// Backend kind of this configuration
    pub fn kind(&self) -> TransportKind {
        match self {
            TransportConfig::Local(_) => TransportKind::Local,
            TransportConfig::Scp(_) => TransportKind::Scp,
            TransportConfig::S3(_) => TransportKind::S3,
            TransportConfig::Atmos(_) => TransportKind::Atmos,
            TransportConfig::Drive(_) => TransportKind::Drive,
            TransportConfig::HashStash(_) => TransportKind::HashStash,
            TransportConfig::WebDav(_) => TransportKind::WebDav,
        }
    }

    /// Short human-readable location of the remote, without credentials
    pub fn describe(&self) -> String {
        match self {
            TransportConfig::Local(c) => c.path.display().to_string(),
            TransportConfig::Scp(c) => match c.port {
                Some(port) => format!("{}@{}:{} (port {})", c.user, c.host, c.path, port),
                None => format!("{}@{}:{}", c.user, c.host, c.path),
            },
            TransportConfig::S3(c) => format!("s3://{} ({})", c.bucket, c.region),
            TransportConfig::Atmos(c) => format!("{} as {}", c.endpoint, c.uid),
            TransportConfig::Drive(c) => format!("{} in collection {}", c.email, c.collection),
            TransportConfig::HashStash(c) => format!("{}:{} for {}", c.host, c.port, c.origin),
            TransportConfig::WebDav(c) => c.url.clone(),
        }
    }
}

/// Local filesystem target (`git-media.localpath`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Directory holding `<oid>` files
    pub path: PathBuf,
}

/// SCP/SSH target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScpConfig {
    /// Login user (`git-media.scpuser`)
    pub user: String,
    /// Remote host (`git-media.scphost`)
    pub host: String,
    /// Remote directory (`git-media.scppath`)
    pub path: String,
    /// SSH port (`git-media.scpport`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// S3-compatible object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket name (`git-media.s3bucket`)
    pub bucket: String,
    /// Access key id (`git-media.s3key`)
    #[serde(skip_serializing, default)]
    pub access_key: String,
    /// Secret access key (`git-media.s3secret`)
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    /// Region (`git-media.s3region`)
    pub region: String,
}

/// EMC Atmos object cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmosConfig {
    /// Base URL (`git-media.endpoint`)
    pub endpoint: String,
    /// Subtenant/user id (`git-media.uid`)
    pub uid: String,
    /// Base64 shared secret (`git-media.secret`)
    #[serde(skip_serializing, default)]
    pub secret: String,
    /// Namespace directory (`git-media.tag`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Drive-style collection endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Account login (`git-media.email`)
    pub email: String,
    /// Application-specific password (`git-media.asp`)
    #[serde(skip_serializing, default)]
    pub app_password: String,
    /// Folder holding the objects (`git-media.collection`)
    pub collection: String,
}

/// Remote cache server, objects scoped by the repository origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashStashConfig {
    /// Server host (`git-media.host`)
    pub host: String,
    /// Server port (`git-media.port`)
    pub port: u16,
    /// Repository origin URL (`remote.origin.url`)
    pub origin: String,
}

/// Generic WebDAV endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebDavConfig {
    /// Collection URL (`git-media.webdavurl`)
    pub url: String,
    /// Basic auth user, possibly from netrc
    pub user: String,
    /// Basic auth password, possibly from netrc
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Verify the server's TLS certificate
    #[serde(default)]
    pub verify_server: bool,
    /// Send uploads as raw binary
    #[serde(default)]
    pub binary_transfer: bool,
}
