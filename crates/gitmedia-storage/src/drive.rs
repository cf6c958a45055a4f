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
//! Google Drive transport
//!
//! Signs in with the account email and an application-specific password,
//! then stores each object as a file titled `<oid>` inside the configured
//! collection (folder). The collection is created on first use.
//!
//! Sign-in and the collection lookup happen once per transport, on the
//! first call that needs them.

use crate::error::{TransportError, TransportResult};
use crate::http;
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use gitmedia_config::DriveConfig;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tokio::sync::OnceCell;
use tracing::debug;

const BACKEND: &str = "drive";

pub const DEFAULT_LOGIN_URL: &str = "https://www.google.com/accounts/ClientLogin";
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/drive/v2";
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v2";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Service endpoints, overridable for testing against a local server
#[derive(Debug, Clone)]
pub struct DriveEndpoints {
    pub login: String,
    pub api: String,
    pub upload: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        DriveEndpoints {
            login: DEFAULT_LOGIN_URL.to_string(),
            api: DEFAULT_API_URL.to_string(),
            upload: DEFAULT_UPLOAD_URL.to_string(),
        }
    }
}

#[derive(Debug)]
struct Session {
    token: String,
    folder_id: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    items: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
}

pub struct DriveTransport {
    client: Client,
    endpoints: DriveEndpoints,
    email: String,
    app_password: String,
    collection: String,
    session: OnceCell<Session>,
}

impl DriveTransport {
    pub fn new(config: &DriveConfig) -> TransportResult<Self> {
        Self::with_endpoints(config, DriveEndpoints::default())
    }

    pub fn with_endpoints(config: &DriveConfig, endpoints: DriveEndpoints) -> TransportResult<Self> {
        Ok(DriveTransport {
            client: http::client(BACKEND, true)?,
            endpoints,
            email: config.email.clone(),
            app_password: config.app_password.clone(),
            collection: config.collection.clone(),
            session: OnceCell::new(),
        })
    }

    async fn session(&self) -> TransportResult<&Session> {
        self.session
            .get_or_try_init(|| async {
                let token = self.login().await?;
                let folder_id = self.folder(&token).await?;
                debug!(collection = %self.collection, folder = %folder_id, "Drive session ready");
                Ok::<_, TransportError>(Session { token, folder_id })
            })
            .await
    }

    async fn login(&self) -> TransportResult<String> {
        let response = self
            .client
            .post(&self.endpoints.login)
            .form(&[
                ("accountType", "HOSTED_OR_GOOGLE"),
                ("Email", self.email.as_str()),
                ("Passwd", self.app_password.as_str()),
                ("service", "writely"),
                ("source", "git-media"),
            ])
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(TransportError::auth_failed(
                    BACKEND,
                    format!("sign-in rejected for {}", self.email),
                ))
            }
            s if s.is_server_error() => {
                return Err(TransportError::unreachable(BACKEND, format!("sign-in answered {}", s)))
            }
            s => return Err(TransportError::backend(BACKEND, format!("sign-in answered {}", s))),
        }

        let body = response.text().await.map_err(|e| http::send_error(BACKEND, e))?;
        body.lines()
            .find_map(|line| line.strip_prefix("Auth="))
            .map(str::to_string)
            .ok_or_else(|| TransportError::auth_failed(BACKEND, "sign-in response carried no token"))
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("GoogleLogin auth={}", token))
    }

    async fn query(&self, token: &str, q: &str) -> TransportResult<Option<String>> {
        let response = self
            .authorized(self.client.get(format!("{}/files", self.endpoints.api)), token)
            .query(&[("q", q)])
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let list: FileList = json(response).await?;
        Ok(list.items.into_iter().next().map(|entry| entry.id))
    }

    /// Id of the collection folder, creating it when missing
    async fn folder(&self, token: &str) -> TransportResult<String> {
        let q = format!(
            "title = '{}' and mimeType = '{}' and trashed = false",
            escape(&self.collection),
            FOLDER_MIME
        );
        if let Some(id) = self.query(token, &q).await? {
            return Ok(id);
        }

        debug!(collection = %self.collection, "Creating Drive collection");
        let response = self
            .authorized(self.client.post(format!("{}/files", self.endpoints.api)), token)
            .json(&serde_json::json!({ "title": self.collection, "mimeType": FOLDER_MIME }))
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let entry: FileEntry = json(response).await?;
        Ok(entry.id)
    }

    async fn find(&self, oid: &Oid) -> TransportResult<Option<String>> {
        let session = self.session().await?;
        let q = format!(
            "title = '{}' and '{}' in parents and trashed = false",
            oid, session.folder_id
        );
        self.query(&session.token, &q).await
    }
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> TransportResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TransportError::auth_failed(BACKEND, format!("server answered {}", status))
            }
            s if s.is_server_error() => {
                TransportError::unreachable(BACKEND, format!("server answered {}", status))
            }
            s => TransportError::backend(BACKEND, format!("unexpected status {}", s)),
        });
    }
    response
        .json()
        .await
        .map_err(|e| TransportError::backend(BACKEND, e))
}

/// Escape a literal for a Drive search query
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

impl fmt::Debug for DriveTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveTransport")
            .field("email", &self.email)
            .field("collection", &self.collection)
            .field("signed_in", &self.session.initialized())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for DriveTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        Ok(self.find(oid).await?.is_some())
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let id = self.find(oid).await?.ok_or(TransportError::NotFound(*oid))?;
        let session = self.session().await?;
        let response = self
            .authorized(
                self.client.get(format!("{}/files/{}", self.endpoints.api, id)),
                &session.token,
            )
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let response = http::ensure_success(BACKEND, oid, response)?;
        let bytes = http::download_to(BACKEND, response, dest).await?;
        debug!(%oid, bytes, "Downloaded object from Drive");
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        if self.find(oid).await?.is_some() {
            debug!(%oid, "Object already present on Drive");
            return Ok(());
        }
        let session = self.session().await?;

        let (body, len) = http::file_body(src).await?;
        let response = self
            .authorized(
                self.client.post(format!("{}/files", self.endpoints.upload)),
                &session.token,
            )
            .query(&[("uploadType", "media")])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let created: FileEntry = json(response).await?;

        let response = self
            .authorized(
                self.client
                    .patch(format!("{}/files/{}", self.endpoints.api, created.id)),
                &session.token,
            )
            .json(&serde_json::json!({
                "title": oid.to_hex(),
                "parents": [{ "id": session.folder_id }],
            }))
            .send()
            .await
            .map_err(|e| http::send_error(BACKEND, e))?;
        let _: FileEntry = json(response).await?;

        debug!(%oid, bytes = len, "Uploaded object to Drive");
        Ok(())
    }
}
