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
//! Property-Based Tests for the clean/smudge filters
//!
//! - smudge(clean(B)) == B
//! - clean output is deterministic and a fixed point of clean
//! - pointers never land in the store as content

use gitmedia_git::{CleanOutcome, FilterDriver, Pointer};
use gitmedia_storage::mock::MockTransport;
use gitmedia_storage::{ContentStore, Oid, TransportHandle};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn arb_binary_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..10000)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn driver(temp: &TempDir, remote: &MockTransport) -> FilterDriver {
    FilterDriver::new(
        ContentStore::for_git_dir(temp.path()),
        TransportHandle::connected(Arc::new(remote.clone())),
        true,
    )
}

/// Property: smudging the pointer of any content yields the content
#[test]
fn proptest_clean_smudge_roundtrip() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&arb_binary_data(), |data| {
            runtime().block_on(async {
                let temp = TempDir::new().unwrap();
                let remote = MockTransport::new();
                let driver = driver(&temp, &remote);

                let mut pointer = Vec::new();
                driver.clean("file", &data[..], &mut pointer).await.unwrap();

                let mut restored = Vec::new();
                driver.smudge("file", &pointer[..], &mut restored).await.unwrap();

                prop_assert_eq!(&data, &restored);
                Ok(())
            })
        })
        .unwrap();
}

/// Property: smudge on a fresh clone pulls what clean pushed
#[test]
fn proptest_roundtrip_through_remote() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&arb_binary_data(), |data| {
            runtime().block_on(async {
                let remote = MockTransport::new();

                let origin = TempDir::new().unwrap();
                let mut pointer = Vec::new();
                driver(&origin, &remote)
                    .clean("file", &data[..], &mut pointer)
                    .await
                    .unwrap();

                let clone = TempDir::new().unwrap();
                let mut restored = Vec::new();
                driver(&clone, &remote)
                    .smudge("file", &pointer[..], &mut restored)
                    .await
                    .unwrap();

                prop_assert_eq!(&data, &restored);
                Ok(())
            })
        })
        .unwrap();
}

/// Property: cleaning is deterministic and idempotent on its own output
#[test]
fn proptest_clean_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&arb_binary_data(), |data| {
            runtime().block_on(async {
                let temp = TempDir::new().unwrap();
                let remote = MockTransport::new();
                let driver = driver(&temp, &remote);

                let mut first = Vec::new();
                driver.clean("a", &data[..], &mut first).await.unwrap();
                let mut second = Vec::new();
                driver.clean("b", &data[..], &mut second).await.unwrap();
                prop_assert_eq!(&first, &second);
                prop_assert_eq!(&first, &Pointer::new(Oid::hash(&data)).to_bytes());

                let mut again = Vec::new();
                let outcome = driver.clean("a", &first[..], &mut again).await.unwrap();
                prop_assert_eq!(&again, &first);
                prop_assert!(matches!(outcome, CleanOutcome::Pointer(_)));

                let stored = driver.store().list_all().await.unwrap();
                prop_assert_eq!(stored, vec![Oid::hash(&data)]);
                Ok(())
            })
        })
        .unwrap();
}
