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
//! In-memory mock transport for testing
//!
//! Provides a thread-safe, in-memory implementation of
//! [`Transport`](crate::Transport) using `Arc<RwLock<HashMap>>`, with call
//! counters and failure injection.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gitmedia_storage::{mock::MockTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = MockTransport::new();
//!     let oid = remote.insert(b"hello".to_vec()).await;
//!
//!     assert!(remote.exists(&oid).await?);
//!     assert_eq!(remote.exists_calls(), 1);
//!     Ok(())
//! }
//! ```

use crate::error::{TransportError, TransportResult};
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Counters {
    exists: AtomicUsize,
    get: AtomicUsize,
    put: AtomicUsize,
}

/// In-memory remote
///
/// Clones share the same objects, counters and injected failures.
#[derive(Clone, Default)]
pub struct MockTransport {
    objects: Arc<RwLock<HashMap<Oid, Vec<u8>>>>,
    counters: Arc<Counters>,
    failures: Arc<RwLock<usize>>,
    offline: Arc<RwLock<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under its own digest
    pub async fn insert(&self, data: Vec<u8>) -> Oid {
        let oid = Oid::hash(&data);
        self.objects.write().await.insert(oid, data);
        oid
    }

    /// Store arbitrary bytes under `oid`, e.g. to simulate remote corruption
    pub async fn insert_raw(&self, oid: Oid, data: Vec<u8>) {
        self.objects.write().await.insert(oid, data);
    }

    pub async fn remove(&self, oid: &Oid) -> Option<Vec<u8>> {
        self.objects.write().await.remove(oid)
    }

    pub async fn contains(&self, oid: &Oid) -> bool {
        self.objects.read().await.contains_key(oid)
    }

    pub async fn data(&self, oid: &Oid) -> Option<Vec<u8>> {
        self.objects.read().await.get(oid).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Make the next `count` calls fail as unreachable
    pub async fn fail_next(&self, count: usize) {
        *self.failures.write().await = count;
    }

    /// Make every call fail as unreachable until switched back
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    pub fn exists_calls(&self) -> usize {
        self.counters.exists.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.counters.get.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.counters.put.load(Ordering::SeqCst)
    }

    async fn check_available(&self) -> TransportResult<()> {
        if *self.offline.read().await {
            return Err(TransportError::unreachable("mock", "remote is offline"));
        }
        let mut failures = self.failures.write().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(TransportError::unreachable("mock", "injected failure"));
        }
        Ok(())
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("exists_calls", &self.exists_calls())
            .field("get_calls", &self.get_calls())
            .field("put_calls", &self.put_calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        self.counters.exists.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;
        Ok(self.contains(oid).await)
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        self.counters.get.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;
        let data = self
            .data(oid)
            .await
            .ok_or(TransportError::NotFound(*oid))?;
        tokio::fs::write(dest, data).await?;
        Ok(())
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        self.counters.put.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;
        let data = tokio::fs::read(src).await?;
        self.objects.write().await.insert(*oid, data);
        Ok(())
    }
}
