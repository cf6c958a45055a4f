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
//! WebDAV transport
//!
//! Objects are plain resources `<url>/<oid>` accessed with HEAD/GET/PUT and
//! HTTP basic authentication. When the collection does not exist yet the
//! first upload creates it with MKCOL.
//!
//! - `verify_server`: validate the server's TLS certificate
//! - `binary_transfer`: label uploads as `application/octet-stream` with a
//!   binary transfer encoding, for servers that otherwise rewrite line
//!   endings

use crate::error::{TransportError, TransportResult};
use crate::http;
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use gitmedia_config::WebDavConfig;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::fmt;
use std::path::Path;
use tracing::debug;

const BACKEND: &str = "webdav";

pub struct WebDavTransport {
    client: Client,
    url: String,
    user: String,
    password: String,
    binary_transfer: bool,
}

impl WebDavTransport {
    pub fn new(config: &WebDavConfig) -> TransportResult<Self> {
        Ok(WebDavTransport {
            client: http::client(BACKEND, config.verify_server)?,
            url: config.url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            binary_transfer: config.binary_transfer,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password))
    }

    fn object_url(&self, oid: &Oid) -> String {
        http::join_url(&self.url, &oid.to_hex())
    }

    async fn upload(&self, oid: &Oid, src: &Path) -> TransportResult<StatusCode> {
        let (body, len) = http::file_body(src).await?;
        let mut request = self
            .request(Method::PUT, self.object_url(oid))
            .header(CONTENT_LENGTH, len);
        if self.binary_transfer {
            request = request
                .header(CONTENT_TYPE, "application/octet-stream")
                .header("Content-Transfer-Encoding", "binary");
        }
        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        Ok(response.status())
    }

    async fn create_collection(&self, oid: &Oid) -> TransportResult<()> {
        let mkcol = Method::from_bytes(b"MKCOL").map_err(|e| TransportError::backend(BACKEND, e))?;
        let response = self
            .request(mkcol, format!("{}/", self.url))
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        match response.status() {
            // 405: the collection appeared concurrently
            s if s.is_success() || s == StatusCode::METHOD_NOT_ALLOWED => Ok(()),
            s => Err(http::status_error(BACKEND, oid, s)),
        }
    }
}

impl fmt::Debug for WebDavTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavTransport")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("binary_transfer", &self.binary_transfer)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for WebDavTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        let response = self
            .request(Method::HEAD, self.object_url(oid))
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        http::exists_from(BACKEND, oid, &response)
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let response = self
            .request(Method::GET, self.object_url(oid))
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let response = http::ensure_success(BACKEND, oid, response)?;
        let bytes = http::download_to(BACKEND, response, dest).await?;
        debug!(%oid, bytes, "Downloaded object from WebDAV");
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        let mut status = self.upload(oid, src).await?;
        if status == StatusCode::CONFLICT {
            debug!(url = %self.url, "Creating WebDAV collection");
            self.create_collection(oid).await?;
            status = self.upload(oid, src).await?;
        }

        if status.is_success() {
            debug!(%oid, "Uploaded object to WebDAV");
            Ok(())
        } else {
            Err(http::status_error(BACKEND, oid, status))
        }
    }
}
