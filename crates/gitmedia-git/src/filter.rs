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
//! Clean and smudge filters
//!
//! Git runs `git-media filter-clean %f` when content enters the index and
//! `git-media filter-smudge %f` when it is written to the working tree. Both
//! stream from stdin to stdout; stdout carries data only.
//!
//! ## Clean
//!
//! Content is hashed while being staged next to the media store, the
//! pointer is written out, and the staged file is committed under its oid.
//! With `git-media.filtersync` enabled the object is uploaded before the
//! commit, so a failed push leaves nothing half-recorded.
//!
//! ## Smudge
//!
//! The pointer is resolved from the store, pulling it from the remote first
//! if needed. A missing object is an error; the working copy is never
//! written with substitute content.

use crate::error::{GitError, GitResult};
use crate::pointer::{Pointer, POINTER_LEN};
use gitmedia_config::MediaConfig;
use gitmedia_storage::{ContentStore, Oid, Transport, TransportExt, TransportHandle};
use std::io;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Bytes inspected before deciding whether input is already a pointer
const PEEK_LEN: usize = POINTER_LEN + 1;

/// What the clean filter did with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    /// Input already was a pointer and was re-emitted unchanged
    Pointer(Oid),
    /// Content was added to the store
    Stored { oid: Oid, size: u64, pushed: bool },
    /// The store already held the content
    Cached { oid: Oid, size: u64 },
}

impl CleanOutcome {
    pub fn oid(&self) -> Oid {
        match self {
            CleanOutcome::Pointer(oid) => *oid,
            CleanOutcome::Stored { oid, .. } | CleanOutcome::Cached { oid, .. } => *oid,
        }
    }
}

/// What the smudge filter wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmudgeOutcome {
    /// Object streamed from the store
    Expanded { oid: Oid, pulled: bool },
    /// Input was not a pointer and was copied through
    Passthrough,
}

/// Filter driver bound to one repository's store and remote
#[derive(Debug)]
pub struct FilterDriver {
    store: ContentStore,
    transport: TransportHandle,
    filter_sync: bool,
}

impl FilterDriver {
    pub fn new(store: ContentStore, transport: TransportHandle, filter_sync: bool) -> Self {
        FilterDriver {
            store,
            transport,
            filter_sync,
        }
    }

    /// Driver using the transport and sync settings of `config`
    pub fn from_config(store: ContentStore, config: &MediaConfig) -> Self {
        Self::new(store, TransportHandle::new(config), config.filter_sync)
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Replace content read from `input` with its pointer on `output`
    ///
    /// `path` is only used in log and error messages.
    pub async fn clean<R, W>(&self, path: &str, mut input: R, output: &mut W) -> GitResult<CleanOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let started = Instant::now();
        let prefix = read_prefix(&mut input).await?;

        if let Some(pointer) = Pointer::parse(&prefix) {
            info!(path, oid = %pointer.oid, "detected hash");
            output.write_all(&prefix).await?;
            output.flush().await?;
            return Ok(CleanOutcome::Pointer(pointer.oid));
        }

        let ingested = self.store.ingest((&prefix[..]).chain(input)).await?;
        let oid = ingested.oid;
        let size = ingested.size;

        output.write_all(&Pointer::new(oid).to_bytes()).await?;
        output.flush().await?;

        if self.store.contains(&oid).await {
            debug!(path, %oid, "Media already cached");
            return Ok(CleanOutcome::Cached { oid, size });
        }

        let mut pushed = false;
        if self.filter_sync {
            pushed = self.push_staged(path, &oid, ingested.temp.path()).await?;
        }

        self.store.commit(ingested.temp, &oid).await?;
        info!(
            path,
            %oid,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Saved media"
        );
        Ok(CleanOutcome::Stored { oid, size, pushed })
    }

    /// Eager upload of freshly cleaned content; returns whether it was sent
    async fn push_staged(&self, path: &str, oid: &Oid, staged: &std::path::Path) -> GitResult<bool> {
        let transport = self
            .transport
            .get()
            .await
            .map_err(|e| GitError::upload_failed(*oid, path, e))?;

        let needs_push = transport
            .needs_push(oid)
            .await
            .map_err(|e| GitError::upload_failed(*oid, path, e))?;
        if !needs_push {
            info!(path, %oid, "Remote already has media, skipping upload");
            return Ok(false);
        }

        transport
            .put_file(oid, staged)
            .await
            .map_err(|e| GitError::upload_failed(*oid, path, e))?;
        debug!(path, %oid, "Uploaded media");
        Ok(true)
    }

    /// Replace a pointer read from `input` with the object's content
    pub async fn smudge<R, W>(&self, path: &str, mut input: R, output: &mut W) -> GitResult<SmudgeOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let prefix = read_prefix(&mut input).await?;

        let Some(pointer) = Pointer::parse(&prefix) else {
            warn!(path, "Input is not a media pointer, passing through");
            output.write_all(&prefix).await?;
            tokio::io::copy(&mut input, output).await?;
            output.flush().await?;
            return Ok(SmudgeOutcome::Passthrough);
        };

        let oid = pointer.oid;
        let pulled = self.ensure_local(path, &oid).await?;

        let mut object = self.store.open(&oid).await?;
        let written = tokio::io::copy(&mut object, output).await?;
        output.flush().await?;
        debug!(path, %oid, written, "Expanded media");
        Ok(SmudgeOutcome::Expanded { oid, pulled })
    }

    /// Make sure `oid` is in the store; returns whether it had to be pulled
    async fn ensure_local(&self, path: &str, oid: &Oid) -> GitResult<bool> {
        if self.store.contains(oid).await {
            return Ok(false);
        }

        info!(path, %oid, "Downloading media");
        let transport = self
            .transport
            .get()
            .await
            .map_err(|e| GitError::fetch_failed(*oid, path, e))?;
        transport
            .pull(&self.store, oid)
            .await
            .map_err(|e| GitError::fetch_failed(*oid, path, e))?;
        Ok(true)
    }
}

/// Read until `PEEK_LEN` bytes are buffered or input ends
async fn read_prefix<R: AsyncRead + Unpin>(input: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; PEEK_LEN];
    let mut filled = 0;
    while filled < PEEK_LEN {
        let n = input.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmedia_storage::mock::MockTransport;
    use gitmedia_storage::TransportError;
    use std::sync::Arc;
    use tempfile::TempDir;

    const HELLO_POINTER: &[u8] = b"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\n";

    fn driver(temp: &TempDir, mock: &MockTransport, filter_sync: bool) -> FilterDriver {
        let store = ContentStore::for_git_dir(temp.path());
        let handle = TransportHandle::connected(Arc::new(mock.clone()));
        FilterDriver::new(store, handle, filter_sync)
    }

    fn offline_driver(temp: &TempDir) -> FilterDriver {
        let config = MediaConfig {
            filter_sync: false,
            ..MediaConfig::default()
        };
        FilterDriver::from_config(ContentStore::for_git_dir(temp.path()), &config)
    }

    #[tokio::test]
    async fn test_clean_hello() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let driver = driver(&temp, &mock, true);

        let mut out = Vec::new();
        let outcome = driver.clean("hello.txt", &b"hello"[..], &mut out).await.unwrap();

        assert_eq!(out, HELLO_POINTER);
        assert_eq!(
            outcome,
            CleanOutcome::Stored {
                oid: Oid::hash(b"hello"),
                size: 5,
                pushed: true
            }
        );
        let stored = temp
            .path()
            .join("media/objects/aa/aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
        assert_eq!(std::fs::read(stored).unwrap(), b"hello");
        assert!(mock.contains(&Oid::hash(b"hello")).await);
    }

    #[tokio::test]
    async fn test_clean_empty_input() {
        let temp = TempDir::new().unwrap();
        let driver = offline_driver(&temp);

        let mut out = Vec::new();
        driver.clean("empty", &b""[..], &mut out).await.unwrap();
        assert_eq!(out, b"da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
    }

    #[tokio::test]
    async fn test_clean_pointer_is_passthrough() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let driver = driver(&temp, &mock, true);

        let mut out = Vec::new();
        let outcome = driver.clean("a.bin", HELLO_POINTER, &mut out).await.unwrap();

        assert_eq!(out, HELLO_POINTER);
        assert_eq!(outcome, CleanOutcome::Pointer(Oid::hash(b"hello")));
        assert!(driver.store().list_all().await.unwrap().is_empty());
        assert_eq!(mock.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_clean_pointer_with_trailing_data_is_content() {
        let temp = TempDir::new().unwrap();
        let driver = offline_driver(&temp);

        let mut input = HELLO_POINTER.to_vec();
        input.push(b'x');
        let mut out = Vec::new();
        let outcome = driver.clean("a.bin", &input[..], &mut out).await.unwrap();
        assert_eq!(outcome.oid(), Oid::hash(&input));
    }

    #[tokio::test]
    async fn test_clean_without_transport_fails() {
        let temp = TempDir::new().unwrap();
        let driver = FilterDriver::from_config(ContentStore::for_git_dir(temp.path()), &MediaConfig::default());

        let mut out = Vec::new();
        let err = driver.clean("a.bin", &b"local only"[..], &mut out).await.unwrap_err();
        assert!(err.to_string().contains("git-media.transport not set"), "{}", err);
        assert!(matches!(err, GitError::UploadFailed { .. }));
        assert!(driver.store().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clean_skips_upload_when_remote_has_it() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        mock.insert(b"shared".to_vec()).await;
        let driver = driver(&temp, &mock, true);

        let mut out = Vec::new();
        let outcome = driver.clean("a.bin", &b"shared"[..], &mut out).await.unwrap();
        assert!(matches!(outcome, CleanOutcome::Stored { pushed: false, .. }));
        assert_eq!(mock.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_clean_upload_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        mock.set_offline(true).await;
        let driver = driver(&temp, &mock, true);

        let mut out = Vec::new();
        let err = driver.clean("clip.mov", &b"movie"[..], &mut out).await.unwrap_err();
        let oid = Oid::hash(b"movie");
        assert!(matches!(err, GitError::UploadFailed { oid: o, .. } if o == oid));
        assert!(err.to_string().contains("clip.mov"));
        assert!(!driver.store().contains(&oid).await);
    }

    #[tokio::test]
    async fn test_clean_without_filter_sync_does_not_push() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let driver = driver(&temp, &mock, false);

        let mut out = Vec::new();
        driver.clean("a.bin", &b"later"[..], &mut out).await.unwrap();
        assert_eq!(mock.exists_calls(), 0);
        assert_eq!(mock.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_clean_twice_reports_cached() {
        let temp = TempDir::new().unwrap();
        let driver = offline_driver(&temp);

        let mut out = Vec::new();
        driver.clean("a", &b"again"[..], &mut out).await.unwrap();
        let mut out = Vec::new();
        let outcome = driver.clean("b", &b"again"[..], &mut out).await.unwrap();
        assert!(matches!(outcome, CleanOutcome::Cached { size: 5, .. }));
    }

    #[tokio::test]
    async fn test_smudge_from_store() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let driver = driver(&temp, &mock, false);

        let mut pointer = Vec::new();
        driver.clean("a", &b"hello"[..], &mut pointer).await.unwrap();

        let mut out = Vec::new();
        let outcome = driver.smudge("a", &pointer[..], &mut out).await.unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(
            outcome,
            SmudgeOutcome::Expanded {
                oid: Oid::hash(b"hello"),
                pulled: false
            }
        );
        assert_eq!(mock.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_smudge_pulls_missing_object() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let oid = mock.insert(b"remote bytes".to_vec()).await;
        let driver = driver(&temp, &mock, false);

        let mut out = Vec::new();
        let outcome = driver
            .smudge("a", &Pointer::new(oid).to_bytes()[..], &mut out)
            .await
            .unwrap();
        assert_eq!(out, b"remote bytes");
        assert_eq!(outcome, SmudgeOutcome::Expanded { oid, pulled: true });
        assert!(driver.store().contains(&oid).await);
    }

    #[tokio::test]
    async fn test_smudge_missing_everywhere_fails() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let driver = driver(&temp, &mock, false);

        let mut out = Vec::new();
        let err = driver.smudge("gone.bin", HELLO_POINTER, &mut out).await.unwrap_err();
        assert!(matches!(err, GitError::FetchFailed { .. }));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_smudge_rejects_corrupt_download() {
        let temp = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let oid = Oid::hash(b"hello");
        mock.insert_raw(oid, b"tampered".to_vec()).await;
        let driver = driver(&temp, &mock, false);

        let mut out = Vec::new();
        let err = driver.smudge("a", HELLO_POINTER, &mut out).await.unwrap_err();
        assert!(matches!(
            err,
            GitError::FetchFailed {
                source: TransportError::Integrity { .. },
                ..
            }
        ));
        assert!(out.is_empty());
        assert!(!driver.store().contains(&oid).await);
    }

    #[tokio::test]
    async fn test_smudge_passes_through_plain_content() {
        let temp = TempDir::new().unwrap();
        let driver = offline_driver(&temp);

        let content = b"this file was committed before it was tracked".to_vec();
        let mut out = Vec::new();
        let outcome = driver.smudge("old.bin", &content[..], &mut out).await.unwrap();
        assert_eq!(outcome, SmudgeOutcome::Passthrough);
        assert_eq!(out, content);
    }
}
