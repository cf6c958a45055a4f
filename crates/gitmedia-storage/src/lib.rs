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
//! Media object storage for git-media
//!
//! This crate holds the two halves of object storage:
//!
//! - [`ContentStore`]: the local cache under `<git-dir>/media/objects`,
//!   addressed by the SHA-1 [`Oid`] of each object's bytes
//! - [`Transport`]: the capability every remote blob store provides
//!   (`exists`, `get_file`, `put_file`), with one implementation per backend
//!   kind
//!
//! Operations that combine the two (pull into the cache, push from it, find
//! unpushed objects) are written once in [`TransportExt`] and work for every
//! backend.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gitmedia_storage::{mock::MockTransport, ContentStore, TransportExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ContentStore::for_git_dir(".git");
//!     let remote = MockTransport::new();
//!
//!     let ingested = store.ingest(&b"hello"[..]).await?;
//!     let oid = ingested.oid;
//!     store.commit(ingested.temp, &oid).await?;
//!
//!     if remote.needs_push(&oid).await? {
//!         remote.push(&store, &oid).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod atmos;
pub mod drive;
pub mod error;
pub mod handle;
pub mod hashstash;
mod http;
pub mod local;
pub mod mock;
pub mod oid;
pub mod retry;
pub mod s3;
pub mod scp;
pub mod store;
pub mod webdav;

use async_trait::async_trait;
use gitmedia_config::TransportConfig;
use std::fmt::Debug;
use std::path::Path;
use tracing::debug;

pub use atmos::AtmosTransport;
pub use drive::DriveTransport;
pub use error::{TransportError, TransportResult};
pub use handle::TransportHandle;
pub use hashstash::HashStashTransport;
pub use local::LocalTransport;
pub use oid::{InvalidOid, Oid, OidHasher};
pub use retry::{RetryPolicy, RetryingTransport};
pub use s3::S3Transport;
pub use scp::ScpTransport;
pub use store::{ContentStore, Ingested, TempObject};
pub use webdav::WebDavTransport;

/// Remote blob store capability
///
/// Implementations only move whole files by oid. Verification, staging and
/// reconciliation are layered on top by [`TransportExt`].
///
/// # Errors
///
/// - `get_file` returns [`TransportError::NotFound`] when the remote lacks
///   the object
/// - connection failures map to [`TransportError::Unreachable`] so the
///   retry policy can act on them
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Whether the remote holds `oid`
    async fn exists(&self, oid: &Oid) -> TransportResult<bool>;

    /// Download `oid` into the file at `dest`, replacing its contents
    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()>;

    /// Upload the file at `src` as `oid`
    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        (**self).exists(oid).await
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        (**self).get_file(oid, dest).await
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        (**self).put_file(oid, src).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        (**self).exists(oid).await
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        (**self).get_file(oid, dest).await
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        (**self).put_file(oid, src).await
    }
}

/// Operations shared by every transport
#[async_trait]
pub trait TransportExt: Transport {
    /// Fetch `oid` into the store, verifying its digest before commit
    async fn pull(&self, store: &ContentStore, oid: &Oid) -> TransportResult<()> {
        let temp = store.temp_file().await?;
        self.get_file(oid, temp.path()).await?;

        let actual = store::hash_file(temp.path()).await?;
        if actual != *oid {
            return Err(TransportError::Integrity {
                expected: *oid,
                actual,
            });
        }

        store.commit(temp, oid).await?;
        debug!(%oid, "Pulled object");
        Ok(())
    }

    /// Upload the stored copy of `oid`
    async fn push(&self, store: &ContentStore, oid: &Oid) -> TransportResult<()> {
        self.put_file(oid, &store.object_path(oid)).await?;
        debug!(%oid, "Pushed object");
        Ok(())
    }

    /// Candidates that are stored locally but missing from the remote
    async fn unpushed(&self, store: &ContentStore, candidates: &[Oid]) -> TransportResult<Vec<Oid>> {
        let mut missing = Vec::new();
        for oid in candidates {
            if !store.contains(oid).await {
                continue;
            }
            if !self.exists(oid).await? {
                missing.push(*oid);
            }
        }
        Ok(missing)
    }

    async fn needs_push(&self, oid: &Oid) -> TransportResult<bool> {
        Ok(!self.exists(oid).await?)
    }
}

impl<T: Transport + ?Sized> TransportExt for T {}

/// Construct the backend selected by `config`
pub async fn open_transport(config: &TransportConfig) -> TransportResult<Box<dyn Transport>> {
    debug!(kind = %config.kind(), remote = %config.describe(), "Opening transport");
    let transport: Box<dyn Transport> = match config {
        TransportConfig::Local(c) => Box::new(LocalTransport::new(&c.path)),
        TransportConfig::Scp(c) => Box::new(ScpTransport::new(c.clone())),
        TransportConfig::S3(c) => Box::new(S3Transport::connect(c).await?),
        TransportConfig::Atmos(c) => Box::new(AtmosTransport::new(c)?),
        TransportConfig::Drive(c) => Box::new(DriveTransport::new(c)?),
        TransportConfig::HashStash(c) => Box::new(HashStashTransport::new(c)?),
        TransportConfig::WebDav(c) => Box::new(WebDavTransport::new(c)?),
    };
    Ok(transport)
}
