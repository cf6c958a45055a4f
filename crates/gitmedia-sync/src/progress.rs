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
use gitmedia_storage::Oid;

/// Receives progress events from long-running reconciliation steps
///
/// Phases are announced with their object count before any object is
/// processed. All methods default to doing nothing.
pub trait SyncObserver: Send + Sync {
    fn phase(&self, _name: &'static str, _total: usize) {}

    fn object(&self, _oid: &Oid) {}

    fn finish(&self) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SyncObserver for Silent {}
