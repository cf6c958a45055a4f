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
//! Amazon S3 transport
//!
//! Objects are stored as `<bucket>/<oid>` using the static access key pair
//! from git config. Downloads stream straight into the destination file and
//! uploads stream from disk, so object size is not limited by memory.

use crate::error::{TransportError, TransportResult};
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use gitmedia_config::S3Config;
use std::fmt;
use std::path::Path;
use tracing::debug;

const BACKEND: &str = "s3";

/// Error codes S3 returns for rejected credentials
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
];

pub struct S3Transport {
    client: Client,
    bucket: String,
}

impl S3Transport {
    /// Build a client for `config` without contacting the service
    pub async fn connect(config: &S3Config) -> TransportResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "git-media",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        debug!(bucket = %config.bucket, region = %config.region, "Configured S3 client");

        Ok(S3Transport {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
        })
    }
}

impl fmt::Debug for S3Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Transport")
            .field("bucket", &self.bucket)
            .finish()
    }
}

fn classify<E>(err: SdkError<E, HttpResponse>) -> TransportError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let reason = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            TransportError::unreachable(BACKEND, reason)
        }
        _ if err.code().is_some_and(|code| AUTH_ERROR_CODES.contains(&code)) => {
            TransportError::auth_failed(BACKEND, reason)
        }
        _ if err
            .raw_response()
            .is_some_and(|r| r.status().is_server_error()) =>
        {
            TransportError::unreachable(BACKEND, reason)
        }
        _ => TransportError::backend(BACKEND, reason),
    }
}

#[async_trait]
impl Transport for S3Transport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        let key = oid.to_hex();
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(classify(err)),
        }
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let key = oid.to_hex();
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(TransportError::NotFound(*oid))
            }
            Err(err) => return Err(classify(err)),
        };

        let mut body = response.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await?;
        let bytes = tokio::io::copy(&mut body, &mut file).await?;
        debug!(%oid, bytes, "Downloaded object from S3");
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| TransportError::backend(BACKEND, e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(oid.to_hex())
            .content_type("application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        debug!(%oid, bucket = %self.bucket, "Uploaded object to S3");
        Ok(())
    }
}
