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
//! # git-media Test Utilities
//!
//! Shared helpers for end-to-end tests:
//! - running the `git-media` binary
//! - temporary git repositories with the media filter installed and a
//!   local directory acting as the remote
//! - assertions on the media store layout

pub mod assertions;
pub mod cli;
pub mod repo;

pub use assertions::*;
pub use cli::{git_media, git_media_path, path_with_git_media};
pub use repo::TestRepo;
