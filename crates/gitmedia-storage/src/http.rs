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
//! Shared plumbing for the HTTP-based transports

use crate::error::{TransportError, TransportResult};
use crate::oid::Oid;
use futures::StreamExt;
use reqwest::{Body, Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn client(backend: &'static str, verify_tls: bool) -> TransportResult<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .danger_accept_invalid_certs(!verify_tls)
        .user_agent(concat!("git-media/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::backend(backend, e))
}

/// Classify a failed request
pub(crate) fn send_error(backend: &'static str, err: reqwest::Error) -> TransportError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        TransportError::unreachable(backend, err)
    } else {
        TransportError::backend(backend, err)
    }
}

/// Map a non-success status onto the transport error taxonomy
pub(crate) fn status_error(backend: &'static str, oid: &Oid, status: StatusCode) -> TransportError {
    match status {
        StatusCode::NOT_FOUND => TransportError::NotFound(*oid),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TransportError::auth_failed(backend, format!("server answered {}", status))
        }
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            TransportError::unreachable(backend, format!("server answered {}", status))
        }
        s => TransportError::backend(backend, format!("unexpected status {}", s)),
    }
}

/// Interpret the response to a HEAD probe
pub(crate) fn exists_from(backend: &'static str, oid: &Oid, response: &Response) -> TransportResult<bool> {
    match response.status() {
        s if s.is_success() => Ok(true),
        StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
        s => Err(status_error(backend, oid, s)),
    }
}

pub(crate) fn ensure_success(backend: &'static str, oid: &Oid, response: Response) -> TransportResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(backend, oid, response.status()))
    }
}

/// Stream a response body into `dest`
pub(crate) async fn download_to(backend: &'static str, response: Response, dest: &Path) -> TransportResult<u64> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| send_error(backend, e))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Streaming request body reading `src`, with its length
pub(crate) async fn file_body(src: &Path) -> TransportResult<(Body, u64)> {
    let file = tokio::fs::File::open(src).await?;
    let len = file.metadata().await?.len();
    Ok((Body::wrap_stream(ReaderStream::new(file)), len))
}

/// `base` joined with `segment`, tolerating a trailing slash on `base`
pub(crate) fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment.trim_start_matches('/'))
}
