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
//! Cache reconciliation for git-media
//!
//! [`SyncCoordinator`] moves objects between the local media store, the
//! remote and the working tree (`status`, `sync`, `download`, `clear`,
//! `list`). [`IntegrityChecker`] verifies stored objects and re-fetches
//! damaged ones (`check`).
//!
//! The local store is the source of truth for what exists locally and is
//! rescanned by every operation. The remote is never enumerated; membership
//! is tested per object.

pub mod checker;
pub mod coordinator;
pub mod error;
pub mod progress;

pub use checker::{CheckOutcome, CheckReport, IntegrityChecker};
pub use coordinator::{
    ClearReport, ListEntry, ObjectSize, PullReport, StatusReport, SyncCoordinator, SyncReport,
};
pub use error::{SyncError, SyncResult};
pub use progress::{Silent, SyncObserver};
