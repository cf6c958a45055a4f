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
//! HashStash cache-server transport
//!
//! A HashStash server keeps objects for many repositories. Requests go to
//! `http://<host>:<port>/objects/<oid>` and carry the repository's origin URL
//! in an `X-Origin` header so the server can scope storage per project.

use crate::error::TransportResult;
use crate::http;
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use gitmedia_config::HashStashConfig;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use std::path::Path;
use tracing::debug;

const BACKEND: &str = "hashstash";

/// Header naming the repository an object belongs to
pub const ORIGIN_HEADER: &str = "X-Origin";

#[derive(Debug)]
pub struct HashStashTransport {
    client: Client,
    base: String,
    origin: String,
}

impl HashStashTransport {
    pub fn new(config: &HashStashConfig) -> TransportResult<Self> {
        Ok(HashStashTransport {
            client: http::client(BACKEND, true)?,
            base: format!("http://{}:{}", config.host, config.port),
            origin: config.origin.clone(),
        })
    }

    fn url(&self, oid: &Oid) -> String {
        http::join_url(&self.base, &format!("objects/{}", oid))
    }

    fn request(&self, method: Method, oid: &Oid) -> RequestBuilder {
        self.client
            .request(method, self.url(oid))
            .header(ORIGIN_HEADER, &self.origin)
    }
}

#[async_trait]
impl Transport for HashStashTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        let response = self
            .request(Method::HEAD, oid)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        http::exists_from(BACKEND, oid, &response)
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let response = self
            .request(Method::GET, oid)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let response = http::ensure_success(BACKEND, oid, response)?;
        let bytes = http::download_to(BACKEND, response, dest).await?;
        debug!(%oid, bytes, "Downloaded object from HashStash");
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        let (body, len) = http::file_body(src).await?;
        let response = self
            .request(Method::PUT, oid)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        http::ensure_success(BACKEND, oid, response)?;
        debug!(%oid, bytes = len, "Uploaded object to HashStash");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        let transport = HashStashTransport::new(&HashStashConfig {
            host: "cache.example.com".to_string(),
            port: 8080,
            origin: "git@example.com:team/game.git".to_string(),
        })
        .unwrap();
        assert_eq!(
            transport.url(&Oid::hash(b"hello")),
            "http://cache.example.com:8080/objects/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
    }
}
