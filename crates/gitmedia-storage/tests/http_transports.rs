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
//! HTTP transports against in-process servers
//!
//! Each test starts a small axum app that behaves like the real service for
//! the handful of requests the transport makes.

use axum::body::Bytes;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, patch, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gitmedia_config::{AtmosConfig, HashStashConfig, WebDavConfig, DriveConfig};
use gitmedia_storage::drive::DriveEndpoints;
use gitmedia_storage::{
    AtmosTransport, ContentStore, DriveTransport, HashStashTransport, Oid, Transport,
    TransportError, TransportExt, WebDavTransport,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Objects = Arc<Mutex<HashMap<String, Vec<u8>>>>;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Store with one committed object, plus its oid
async fn seeded_store(temp: &TempDir, data: &[u8]) -> (ContentStore, Oid) {
    let store = ContentStore::for_git_dir(temp.path().join("git"));
    let ingested = store.ingest(data).await.unwrap();
    store.commit(ingested.temp, &ingested.oid).await.unwrap();
    (store, ingested.oid)
}

/// Generic sync exercise: push, probe, pull into a fresh store
async fn exercise(remote: &dyn Transport) {
    let temp = TempDir::new().unwrap();
    let (store, oid) = seeded_store(&temp, b"binary \x00\x01 payload").await;

    assert!(remote.needs_push(&oid).await.unwrap());
    remote.push(&store, &oid).await.unwrap();
    assert!(remote.exists(&oid).await.unwrap());
    assert_eq!(remote.unpushed(&store, &[oid]).await.unwrap(), vec![]);

    let fresh = ContentStore::for_git_dir(temp.path().join("other"));
    remote.pull(&fresh, &oid).await.unwrap();
    assert_eq!(
        std::fs::read(fresh.object_path(&oid)).unwrap(),
        b"binary \x00\x01 payload"
    );

    let missing = Oid::hash(b"never uploaded");
    let err = remote.pull(&fresh, &missing).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

// ---------------------------------------------------------------- hashstash

#[derive(Clone, Default)]
struct HashStashState {
    objects: Objects,
}

async fn hashstash_object(
    State(state): State<HashStashState>,
    method: Method,
    headers: HeaderMap,
    UrlPath(oid): UrlPath<String>,
    body: Bytes,
) -> Response {
    let Some(origin) = headers.get("x-origin").and_then(|v| v.to_str().ok()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let key = format!("{}#{}", origin, oid);
    let mut objects = state.objects.lock().unwrap();
    match method {
        Method::PUT => {
            objects.insert(key, body.to_vec());
            StatusCode::CREATED.into_response()
        }
        Method::GET | Method::HEAD => match objects.get(&key) {
            Some(data) => data.clone().into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

#[tokio::test]
async fn test_hashstash_scopes_by_origin() {
    let state = HashStashState::default();
    let app = Router::new()
        .route("/objects/{oid}", any(hashstash_object))
        .with_state(state.clone());
    let addr = serve(app).await;

    let config = |origin: &str| HashStashConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        origin: origin.to_string(),
    };
    let remote = HashStashTransport::new(&config("git@example.com:team/game.git")).unwrap();
    exercise(&remote).await;

    // another repository sees none of it
    let other = HashStashTransport::new(&config("git@example.com:team/other.git")).unwrap();
    let oid = Oid::hash(b"binary \x00\x01 payload");
    assert!(!other.exists(&oid).await.unwrap());
    assert_eq!(state.objects.lock().unwrap().len(), 1);
}

// ------------------------------------------------------------------- webdav

#[derive(Clone, Default)]
struct DavState {
    objects: Objects,
    collection: Arc<Mutex<bool>>,
    mkcol_calls: Arc<Mutex<usize>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

fn dav_authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Basic {}", STANDARD.encode("alice:s3cret"));
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

async fn dav_collection(State(state): State<DavState>, method: Method, headers: HeaderMap) -> Response {
    if !dav_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if method.as_str() != "MKCOL" {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    *state.mkcol_calls.lock().unwrap() += 1;
    *state.collection.lock().unwrap() = true;
    StatusCode::CREATED.into_response()
}

async fn dav_object(
    State(state): State<DavState>,
    method: Method,
    headers: HeaderMap,
    UrlPath(name): UrlPath<String>,
    body: Bytes,
) -> Response {
    if !dav_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match method {
        Method::PUT => {
            if !*state.collection.lock().unwrap() {
                return StatusCode::CONFLICT.into_response();
            }
            if let Some(ct) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
                state.content_types.lock().unwrap().push(ct.to_string());
            }
            state.objects.lock().unwrap().insert(name, body.to_vec());
            StatusCode::CREATED.into_response()
        }
        Method::GET | Method::HEAD => match state.objects.lock().unwrap().get(&name) {
            Some(data) => data.clone().into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn dav_app(state: DavState) -> Router {
    Router::new()
        .route("/dav/", any(dav_collection))
        .route("/dav/{name}", any(dav_object))
        .with_state(state)
}

#[tokio::test]
async fn test_webdav_creates_collection_on_first_upload() {
    let state = DavState::default();
    let addr = serve(dav_app(state.clone())).await;

    let remote = WebDavTransport::new(&WebDavConfig {
        url: format!("http://{}/dav/", addr),
        user: "alice".to_string(),
        password: "s3cret".to_string(),
        verify_server: true,
        binary_transfer: true,
    })
    .unwrap();
    exercise(&remote).await;

    assert_eq!(*state.mkcol_calls.lock().unwrap(), 1);
    assert_eq!(
        *state.content_types.lock().unwrap(),
        vec!["application/octet-stream".to_string()]
    );
}

#[tokio::test]
async fn test_webdav_rejected_credentials() {
    let addr = serve(dav_app(DavState::default())).await;

    let remote = WebDavTransport::new(&WebDavConfig {
        url: format!("http://{}/dav", addr),
        user: "alice".to_string(),
        password: "wrong".to_string(),
        verify_server: false,
        binary_transfer: false,
    })
    .unwrap();

    let err = remote.exists(&Oid::hash(b"x")).await.unwrap_err();
    assert!(matches!(err, TransportError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_unreachable_server() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = WebDavTransport::new(&WebDavConfig {
        url: format!("http://{}/dav", addr),
        user: "alice".to_string(),
        password: "s3cret".to_string(),
        verify_server: true,
        binary_transfer: false,
    })
    .unwrap();
    let err = remote.exists(&Oid::hash(b"x")).await.unwrap_err();
    assert!(err.is_retryable(), "unexpected error: {}", err);
}

// -------------------------------------------------------------------- atmos

async fn atmos_object(
    State(objects): State<Objects>,
    method: Method,
    headers: HeaderMap,
    UrlPath((tag, oid)): UrlPath<(String, String)>,
    body: Bytes,
) -> Response {
    let signed = ["x-emc-uid", "x-emc-date", "x-emc-signature"]
        .iter()
        .all(|h| headers.contains_key(*h));
    if !signed || headers["x-emc-uid"] != "subtenant/media" {
        return StatusCode::FORBIDDEN.into_response();
    }

    let key = format!("{}/{}", tag, oid);
    let mut objects = objects.lock().unwrap();
    match method {
        Method::POST if objects.contains_key(&key) => StatusCode::BAD_REQUEST.into_response(),
        Method::POST => {
            objects.insert(key, body.to_vec());
            StatusCode::CREATED.into_response()
        }
        Method::GET | Method::HEAD => match objects.get(&key) {
            Some(data) => data.clone().into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

#[tokio::test]
async fn test_atmos_signed_requests() {
    let objects = Objects::default();
    let app = Router::new()
        .route("/rest/namespace/{tag}/{oid}", any(atmos_object))
        .with_state(objects.clone());
    let addr = serve(app).await;

    let remote = AtmosTransport::new(&AtmosConfig {
        endpoint: format!("http://{}", addr),
        uid: "subtenant/media".to_string(),
        secret: STANDARD.encode(b"shared secret"),
        tag: Some("game".to_string()),
    })
    .unwrap();
    exercise(&remote).await;

    // uploading existing content again succeeds
    let temp = TempDir::new().unwrap();
    let (store, oid) = seeded_store(&temp, b"binary \x00\x01 payload").await;
    remote.push(&store, &oid).await.unwrap();
    assert!(objects
        .lock()
        .unwrap()
        .contains_key(&format!("game/{}", oid)));
}

// -------------------------------------------------------------------- drive

#[derive(Debug, Clone)]
struct DriveFile {
    title: String,
    parent: Option<String>,
    folder: bool,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
struct DriveState {
    files: Arc<Mutex<HashMap<String, DriveFile>>>,
    logins: Arc<Mutex<usize>>,
}

impl DriveState {
    fn add(&self, file: DriveFile) -> String {
        let mut files = self.files.lock().unwrap();
        let id = format!("id{}", files.len() + 1);
        files.insert(id.clone(), file);
        id
    }
}

fn drive_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .is_some_and(|v| v == "GoogleLogin auth=token-123")
}

/// Value of `<field> = '<value>'` in a search query
fn query_term<'a>(q: &'a str, field: &str) -> Option<&'a str> {
    let start = q.find(&format!("{} = '", field))? + field.len() + 4;
    let len = q[start..].find('\'')?;
    Some(&q[start..start + len])
}

async fn drive_login(State(state): State<DriveState>, body: String) -> Response {
    *state.logins.lock().unwrap() += 1;
    if body.contains("Passwd=app-password") && body.contains("Email=alice%40example.com") {
        "SID=abc\nLSID=def\nAuth=token-123\n".into_response()
    } else {
        (StatusCode::FORBIDDEN, "Error=BadAuthentication").into_response()
    }
}

async fn drive_list(
    State(state): State<DriveState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !drive_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    let title = query_term(&q, "title").unwrap_or_default().to_string();
    let want_folder = q.contains("application/vnd.google-apps.folder");
    let parent = q
        .split(" in parents")
        .next()
        .and_then(|head| head.rsplit('\'').nth(1))
        .filter(|_| q.contains(" in parents"))
        .map(str::to_string);

    let files = state.files.lock().unwrap();
    let items: Vec<_> = files
        .iter()
        .filter(|(_, f)| f.title == title && f.folder == want_folder)
        .filter(|(_, f)| parent.is_none() || f.parent == parent)
        .map(|(id, _)| serde_json::json!({ "id": id }))
        .collect();
    Json(serde_json::json!({ "items": items })).into_response()
}

async fn drive_create_folder(
    State(state): State<DriveState>,
    headers: HeaderMap,
    Json(meta): Json<serde_json::Value>,
) -> Response {
    if !drive_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = state.add(DriveFile {
        title: meta["title"].as_str().unwrap_or_default().to_string(),
        parent: None,
        folder: true,
        data: Vec::new(),
    });
    Json(serde_json::json!({ "id": id })).into_response()
}

async fn drive_upload(State(state): State<DriveState>, headers: HeaderMap, body: Bytes) -> Response {
    if !drive_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = state.add(DriveFile {
        title: "Untitled".to_string(),
        parent: None,
        folder: false,
        data: body.to_vec(),
    });
    Json(serde_json::json!({ "id": id })).into_response()
}

async fn drive_file(
    State(state): State<DriveState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Response {
    if !drive_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.files.lock().unwrap().get(&id) {
        Some(file) => file.data.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn drive_patch(
    State(state): State<DriveState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
    Json(meta): Json<serde_json::Value>,
) -> Response {
    if !drive_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut files = state.files.lock().unwrap();
    let Some(file) = files.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    file.title = meta["title"].as_str().unwrap_or_default().to_string();
    file.parent = meta["parents"][0]["id"].as_str().map(str::to_string);
    Json(serde_json::json!({ "id": id })).into_response()
}

async fn drive_server(state: DriveState) -> DriveEndpoints {
    let app = Router::new()
        .route("/login", post(drive_login))
        .route("/api/files", get(drive_list).post(drive_create_folder))
        .route("/api/files/{id}", patch(drive_patch).get(drive_file))
        .route("/upload/files", post(drive_upload))
        .with_state(state);
    let addr = serve(app).await;
    DriveEndpoints {
        login: format!("http://{}/login", addr),
        api: format!("http://{}/api", addr),
        upload: format!("http://{}/upload", addr),
    }
}

#[tokio::test]
async fn test_drive_collection_and_files() {
    let state = DriveState::default();
    let endpoints = drive_server(state.clone()).await;

    let config = DriveConfig {
        email: "alice@example.com".to_string(),
        app_password: "app-password".to_string(),
        collection: "game media".to_string(),
    };
    let remote = DriveTransport::with_endpoints(&config, endpoints).unwrap();
    exercise(&remote).await;

    // one sign-in per transport, one folder plus one object
    assert_eq!(*state.logins.lock().unwrap(), 1);
    let files = state.files.lock().unwrap();
    assert_eq!(files.values().filter(|f| f.folder).count(), 1);
    let objects: Vec<_> = files.values().filter(|f| !f.folder).collect();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].title, Oid::hash(b"binary \x00\x01 payload").to_string());
}

#[tokio::test]
async fn test_drive_bad_password() {
    let endpoints = drive_server(DriveState::default()).await;
    let config = DriveConfig {
        email: "alice@example.com".to_string(),
        app_password: "wrong".to_string(),
        collection: "media".to_string(),
    };
    let remote = DriveTransport::with_endpoints(&config, endpoints).unwrap();
    let err = remote.exists(&Oid::hash(b"x")).await.unwrap_err();
    assert!(matches!(err, TransportError::AuthenticationFailed { .. }));
}
