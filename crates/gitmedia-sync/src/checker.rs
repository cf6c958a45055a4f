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
//! Store integrity verification
//!
//! Every stored object is rehashed. A mismatch means the file was damaged
//! after it was committed; the local copy is deleted and a fresh one pulled.

use crate::error::SyncResult;
use crate::progress::{Silent, SyncObserver};
use gitmedia_storage::{ContentStore, Oid, TransportExt, TransportHandle};
use std::fmt;
use tracing::{debug, error, info};

/// Result of checking one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Verified,
    /// Was corrupt, re-fetched successfully
    Repaired,
    /// Was corrupt and could not be re-fetched
    Unrecoverable(String),
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Verified => f.write_str("ok"),
            CheckOutcome::Repaired => f.write_str("repaired"),
            CheckOutcome::Unrecoverable(reason) => write!(f, "unrecoverable: {}", reason),
        }
    }
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub results: Vec<(Oid, CheckOutcome)>,
}

impl CheckReport {
    pub fn verified(&self) -> usize {
        self.count(|o| *o == CheckOutcome::Verified)
    }

    pub fn repaired(&self) -> usize {
        self.count(|o| *o == CheckOutcome::Repaired)
    }

    pub fn unrecoverable(&self) -> impl Iterator<Item = (&Oid, &str)> {
        self.results.iter().filter_map(|(oid, outcome)| match outcome {
            CheckOutcome::Unrecoverable(reason) => Some((oid, reason.as_str())),
            _ => None,
        })
    }

    /// No object was left damaged or missing
    pub fn is_healthy(&self) -> bool {
        self.unrecoverable().next().is_none()
    }

    fn count(&self, pred: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }
}

#[derive(Debug)]
pub struct IntegrityChecker {
    store: ContentStore,
    transport: TransportHandle,
}

impl IntegrityChecker {
    pub fn new(store: ContentStore, transport: TransportHandle) -> Self {
        IntegrityChecker { store, transport }
    }

    /// Verify every stored object
    ///
    /// A failed repair is recorded and the scan continues. The remote is
    /// contacted only once a corrupt object is found.
    pub async fn check(&self) -> SyncResult<CheckReport> {
        self.check_with(&Silent).await
    }

    pub async fn check_with(&self, observer: &dyn SyncObserver) -> SyncResult<CheckReport> {
        let oids = self.store.list_all().await?;
        let mut report = CheckReport::default();

        observer.phase("check", oids.len());
        for oid in oids {
            let outcome = match self.store.rehash(&oid).await {
                Ok(actual) if actual == oid => {
                    debug!(%oid, "Verified");
                    CheckOutcome::Verified
                }
                Ok(actual) => {
                    error!(expected = %oid, %actual, "Media object is corrupt");
                    self.repair(&oid).await
                }
                Err(e) => {
                    error!(%oid, "Cannot read media object: {}", e);
                    self.repair(&oid).await
                }
            };
            observer.object(&oid);
            report.results.push((oid, outcome));
        }
        observer.finish();

        Ok(report)
    }

    async fn repair(&self, oid: &Oid) -> CheckOutcome {
        if let Err(e) = self.store.remove(oid).await {
            return CheckOutcome::Unrecoverable(format!("cannot remove damaged copy: {}", e));
        }

        let transport = match self.transport.get().await {
            Ok(transport) => transport,
            Err(e) => return CheckOutcome::Unrecoverable(e.to_string()),
        };

        match transport.pull(&self.store, oid).await {
            Ok(()) => {
                info!(%oid, "Re-downloaded media");
                CheckOutcome::Repaired
            }
            Err(e) => {
                error!(%oid, "Cannot repair media: {}", e);
                CheckOutcome::Unrecoverable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitmedia_config::MediaConfig;
    use gitmedia_storage::mock::MockTransport;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn put(store: &ContentStore, data: &[u8]) -> Oid {
        let ingested = store.ingest(data).await.unwrap();
        store.commit(ingested.temp, &ingested.oid).await.unwrap();
        ingested.oid
    }

    fn corrupt(store: &ContentStore, oid: &Oid) {
        std::fs::write(store.object_path(oid), b"bit rot").unwrap();
    }

    #[tokio::test]
    async fn test_healthy_store_needs_no_transport() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::for_git_dir(temp.path());
        put(&store, b"one").await;
        put(&store, b"two").await;

        let checker = IntegrityChecker::new(store, TransportHandle::new(&MediaConfig::default()));
        let report = checker.check().await.unwrap();
        assert_eq!(report.verified(), 2);
        assert!(report.is_healthy());
    }

    #[tokio::test]
    async fn test_corrupt_object_is_refetched() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::for_git_dir(temp.path());
        let mock = MockTransport::new();
        let oid = put(&store, b"hello").await;
        mock.insert(b"hello".to_vec()).await;
        corrupt(&store, &oid);

        let checker = IntegrityChecker::new(
            store.clone(),
            TransportHandle::connected(Arc::new(mock.clone())),
        );
        let report = checker.check().await.unwrap();
        assert_eq!(report.results, vec![(oid, CheckOutcome::Repaired)]);
        assert_eq!(std::fs::read(store.object_path(&oid)).unwrap(), b"hello");
        assert_eq!(mock.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_unrecoverable_does_not_stop_scan() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::for_git_dir(temp.path());
        let mock = MockTransport::new();
        let lost = put(&store, b"never pushed").await;
        let fine = put(&store, b"fine").await;
        corrupt(&store, &lost);

        let checker = IntegrityChecker::new(
            store.clone(),
            TransportHandle::connected(Arc::new(mock)),
        );
        let report = checker.check().await.unwrap();

        assert!(!report.is_healthy());
        assert_eq!(report.verified(), 1);
        let unrecoverable: Vec<_> = report.unrecoverable().map(|(oid, _)| *oid).collect();
        assert_eq!(unrecoverable, vec![lost]);
        assert!(!store.contains(&lost).await);
        assert!(store.contains(&fine).await);
    }

    #[tokio::test]
    async fn test_corruption_without_transport_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::for_git_dir(temp.path());
        let oid = put(&store, b"data").await;
        corrupt(&store, &oid);

        let checker = IntegrityChecker::new(store, TransportHandle::new(&MediaConfig::default()));
        let report = checker.check().await.unwrap();
        assert!(matches!(
            report.results.as_slice(),
            [(o, CheckOutcome::Unrecoverable(_))] if *o == oid
        ));
    }
}
