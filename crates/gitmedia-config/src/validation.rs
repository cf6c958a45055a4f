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
//! Semantic checks on resolved configuration

use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

/// Trait for validating resolved configuration
pub trait Validator {
    /// Check values the loader cannot reject by presence alone
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for MediaConfig {
    fn validate(&self) -> ConfigResult<()> {
        match &self.transport {
            Some(transport) => transport.validate(),
            None => Ok(()),
        }
    }
}

impl Validator for TransportConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            TransportConfig::Local(local) => local.validate(),
            TransportConfig::Scp(scp) => scp.validate(),
            TransportConfig::S3(s3) => s3.validate(),
            TransportConfig::Atmos(atmos) => atmos.validate(),
            TransportConfig::Drive(drive) => drive.validate(),
            TransportConfig::HashStash(hs) => hs.validate(),
            TransportConfig::WebDav(dav) => dav.validate(),
        }
    }
}

impl Validator for LocalConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::missing("git-media.localpath", "local"));
        }
        Ok(())
    }
}

impl Validator for ScpConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.host.contains(char::is_whitespace) || self.host.starts_with('-') {
            return Err(ConfigError::invalid_value(
                "git-media.scphost",
                format!("not a valid host name: '{}'", self.host),
            ));
        }
        if self.user.contains(['@', ':']) || self.user.starts_with('-') {
            return Err(ConfigError::invalid_value(
                "git-media.scpuser",
                format!("not a valid user name: '{}'", self.user),
            ));
        }
        Ok(())
    }
}

impl Validator for S3Config {
    fn validate(&self) -> ConfigResult<()> {
        // S3 bucket names must be 3-63 characters long
        if self.bucket.len() < 3 || self.bucket.len() > 63 {
            return Err(ConfigError::invalid_value(
                "git-media.s3bucket",
                "bucket name must be 3-63 characters long",
            ));
        }

        if !self
            .bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            return Err(ConfigError::invalid_value(
                "git-media.s3bucket",
                "bucket name may only contain lowercase letters, digits, '-' and '.'",
            ));
        }

        if self.region.is_empty() {
            return Err(ConfigError::invalid_value("git-media.s3region", "must not be empty"));
        }
        Ok(())
    }
}

impl Validator for AtmosConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_http_url("git-media.endpoint", &self.endpoint)?;
        if let Some(tag) = &self.tag {
            if tag.contains('/') {
                return Err(ConfigError::invalid_value(
                    "git-media.tag",
                    "tag must not contain '/'",
                ));
            }
        }
        Ok(())
    }
}

impl Validator for DriveConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.email.contains('@') {
            return Err(ConfigError::invalid_value(
                "git-media.email",
                format!("not an email address: '{}'", self.email),
            ));
        }
        Ok(())
    }
}

impl Validator for HashStashConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.host.contains(['/', ' ']) {
            return Err(ConfigError::invalid_value(
                "git-media.host",
                "expected a bare host name without scheme or path",
            ));
        }
        Ok(())
    }
}

impl Validator for WebDavConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_http_url("git-media.webdavurl", &self.url)
    }
}

fn validate_http_url(field: &str, url: &str) -> ConfigResult<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            field,
            format!("URL must start with http:// or https://, got '{}'", url),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn s3(bucket: &str) -> S3Config {
        S3Config {
            bucket: bucket.to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            region: DEFAULT_S3_REGION.to_string(),
        }
    }

    #[test]
    fn test_s3_bucket_rules() {
        assert!(s3("media-bucket.v1").validate().is_ok());
        assert!(s3("ab").validate().is_err());
        assert!(s3("Media_Bucket").validate().is_err());
    }

    #[test]
    fn test_webdav_url_scheme() {
        let mut dav = WebDavConfig {
            url: "https://dav.example.com/media".to_string(),
            user: "alice".to_string(),
            password: "pw".to_string(),
            verify_server: false,
            binary_transfer: false,
        };
        assert!(dav.validate().is_ok());

        dav.url = "ftp://dav.example.com".to_string();
        assert!(TransportConfig::WebDav(dav).validate().is_err());
    }

    #[test]
    fn test_local_and_unset() {
        assert!(MediaConfig::default().validate().is_ok());

        let local = LocalConfig { path: PathBuf::new() };
        assert!(local.validate().is_err());
    }

    #[test]
    fn test_scp_rejects_option_injection() {
        let scp = ScpConfig {
            user: "media".to_string(),
            host: "-oProxyCommand=evil".to_string(),
            path: "/srv/media".to_string(),
            port: None,
        };
        assert!(scp.validate().is_err());
    }
}
