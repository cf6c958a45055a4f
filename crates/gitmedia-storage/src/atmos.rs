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
//! EMC Atmos transport
//!
//! Objects are addressed through the Atmos namespace interface as
//! `/rest/namespace/<tag>/<oid>` (or `/rest/namespace/<oid>` without a tag).
//! Every request carries `x-emc-uid`, `x-emc-date` and an `x-emc-signature`
//! computed as base64(HMAC-SHA1(secret, canonical request)), where the
//! shared secret is itself base64-encoded.

use crate::error::{TransportError, TransportResult};
use crate::http;
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gitmedia_config::AtmosConfig;
use hmac::{Hmac, Mac};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, DATE};
use reqwest::{Client, Method, RequestBuilder};
use sha1::Sha1;
use std::fmt;
use std::path::Path;
use tracing::debug;

const BACKEND: &str = "atmos";
const NAMESPACE: &str = "/rest/namespace";
const OCTET_STREAM: &str = "application/octet-stream";

pub struct AtmosTransport {
    client: Client,
    endpoint: String,
    uid: String,
    mac: Hmac<Sha1>,
    tag: Option<String>,
}

impl AtmosTransport {
    pub fn new(config: &AtmosConfig) -> TransportResult<Self> {
        let key = STANDARD.decode(config.secret.trim()).map_err(|e| {
            TransportError::auth_failed(BACKEND, format!("git-media.secret is not valid base64: {}", e))
        })?;
        let mac = Hmac::<Sha1>::new_from_slice(&key)
            .map_err(|e| TransportError::auth_failed(BACKEND, e))?;

        Ok(AtmosTransport {
            client: http::client(BACKEND, true)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            uid: config.uid.clone(),
            mac,
            tag: config.tag.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Namespace path of `oid`
    fn resource(&self, oid: &Oid) -> String {
        match &self.tag {
            Some(tag) => format!("{}/{}/{}", NAMESPACE, tag, oid),
            None => format!("{}/{}", NAMESPACE, oid),
        }
    }

    /// Signature over the canonical form of a request
    fn sign(&self, method: &Method, content_type: &str, date: &str, resource: &str) -> String {
        let canonical = format!(
            "{}\n{}\n\n{}\n{}\nx-emc-date:{}\nx-emc-uid:{}",
            method.as_str(),
            content_type,
            date,
            resource.to_lowercase(),
            date,
            self.uid
        );

        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    fn request(&self, method: Method, oid: &Oid, content_type: &str) -> RequestBuilder {
        let resource = self.resource(oid);
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let signature = self.sign(&method, content_type, &date, &resource);

        let mut builder = self
            .client
            .request(method, http::join_url(&self.endpoint, &resource))
            .header(DATE, &date)
            .header("x-emc-date", &date)
            .header("x-emc-uid", &self.uid)
            .header("x-emc-signature", signature);
        if !content_type.is_empty() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder
    }
}

impl fmt::Debug for AtmosTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtmosTransport")
            .field("endpoint", &self.endpoint)
            .field("uid", &self.uid)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for AtmosTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        let response = self
            .request(Method::HEAD, oid, "")
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        http::exists_from(BACKEND, oid, &response)
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let response = self
            .request(Method::GET, oid, "")
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let response = http::ensure_success(BACKEND, oid, response)?;
        let bytes = http::download_to(BACKEND, response, dest).await?;
        debug!(%oid, bytes, "Downloaded object from Atmos");
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        let (body, len) = http::file_body(src).await?;
        let response = self
            .request(Method::POST, oid, OCTET_STREAM)
            .header(CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;

        if response.status().is_success() {
            debug!(%oid, bytes = len, "Uploaded object to Atmos");
            return Ok(());
        }

        // Atmos refuses to create an existing path; identical content is already there
        let status = response.status();
        if status.is_client_error() && self.exists(oid).await? {
            debug!(%oid, "Object already present on Atmos");
            return Ok(());
        }
        Err(http::status_error(BACKEND, oid, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(tag: Option<&str>) -> AtmosTransport {
        AtmosTransport::new(&AtmosConfig {
            endpoint: "https://atmos.example.com/".to_string(),
            uid: "subtenant/media".to_string(),
            secret: STANDARD.encode(b"shared secret"),
            tag: tag.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_resource_paths() {
        let oid = Oid::hash(b"hello");
        assert_eq!(
            transport(Some("media")).resource(&oid),
            "/rest/namespace/media/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        assert_eq!(
            transport(None).resource(&oid),
            "/rest/namespace/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
    }

    #[test]
    fn test_signature_shape() {
        let t = transport(Some("media"));
        let date = "Thu, 05 Jun 2008 16:38:19 GMT";
        let resource = t.resource(&Oid::hash(b"hello"));

        let get = t.sign(&Method::GET, "", date, &resource);
        let head = t.sign(&Method::HEAD, "", date, &resource);
        // base64 of a 20-byte digest
        assert_eq!(STANDARD.decode(&get).unwrap().len(), 20);
        assert_ne!(get, head);
        assert_eq!(get, t.sign(&Method::GET, "", date, &resource.to_uppercase()));
    }

    #[test]
    fn test_invalid_secret_rejected() {
        let err = AtmosTransport::new(&AtmosConfig {
            endpoint: "https://atmos.example.com".to_string(),
            uid: "uid".to_string(),
            secret: "not base64!".to_string(),
            tag: None,
        })
        .unwrap_err();
        assert!(matches!(err, TransportError::AuthenticationFailed { .. }));
    }
}
