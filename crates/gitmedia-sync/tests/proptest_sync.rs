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
//! Property-Based Tests for reconciliation
//!
//! - unpushed(list_all) is a subset of list_all
//! - clear never deletes an object the remote lacks
//! - push leaves nothing unpushed

use gitmedia_storage::mock::MockTransport;
use gitmedia_storage::{ContentStore, Oid, TransportExt, TransportHandle};
use gitmedia_sync::SyncCoordinator;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

/// Objects, each flagged with whether the remote already has it
fn arb_objects() -> impl Strategy<Value = Vec<(Vec<u8>, bool)>> {
    prop::collection::vec((prop::collection::vec(any::<u8>(), 0..256), any::<bool>()), 0..24)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn populate(store: &ContentStore, remote: &MockTransport, objects: &[(Vec<u8>, bool)]) {
    for (data, on_remote) in objects {
        let ingested = store.ingest(&data[..]).await.unwrap();
        store.commit(ingested.temp, &ingested.oid).await.unwrap();
        if *on_remote {
            remote.insert(data.clone()).await;
        }
    }
}

/// Property: clear removes exactly the objects the remote has
#[test]
fn proptest_clear_never_drops_unpushed() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&arb_objects(), |objects| {
            runtime().block_on(async {
                let temp = TempDir::new().unwrap();
                let store = ContentStore::for_git_dir(temp.path());
                let remote = MockTransport::new();
                populate(&store, &remote, &objects).await;

                let before = store.list_all().await.unwrap();
                let unpushed: HashSet<Oid> = remote
                    .unpushed(&store, &before)
                    .await
                    .unwrap()
                    .into_iter()
                    .collect();
                prop_assert!(unpushed.iter().all(|oid| before.contains(oid)));

                let sync = SyncCoordinator::new(
                    store.clone(),
                    TransportHandle::connected(Arc::new(remote.clone())),
                );
                let report = sync.clear().await.unwrap();

                let after: HashSet<Oid> = store.list_all().await.unwrap().into_iter().collect();
                prop_assert_eq!(&after, &unpushed);
                for oid in &report.removed {
                    prop_assert!(remote.contains(oid).await);
                }
                Ok(())
            })
        })
        .unwrap();
}

/// Property: after push the remote holds every stored object
#[test]
fn proptest_push_completes_remote() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&arb_objects(), |objects| {
            runtime().block_on(async {
                let temp = TempDir::new().unwrap();
                let store = ContentStore::for_git_dir(temp.path());
                let remote = MockTransport::new();
                populate(&store, &remote, &objects).await;

                let sync = SyncCoordinator::new(
                    store.clone(),
                    TransportHandle::connected(Arc::new(remote.clone())),
                );
                sync.push().await.unwrap();

                let local = store.list_all().await.unwrap();
                prop_assert!(remote.unpushed(&store, &local).await.unwrap().is_empty());
                Ok(())
            })
        })
        .unwrap();
}
