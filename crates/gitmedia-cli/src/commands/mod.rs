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
// Command modules for the git-media CLI
pub mod check;
pub mod filter;
pub mod install;
pub mod status;
pub mod sync;
pub mod track;

pub use check::CheckCmd;
pub use filter::{CleanCmd, SmudgeCmd};
pub use install::{InstallCmd, UninstallCmd};
pub use status::{ListCmd, StatusCmd};
pub use sync::{ClearCmd, DownloadCmd, SyncCmd};
pub use track::{TrackCmd, UntrackCmd};
