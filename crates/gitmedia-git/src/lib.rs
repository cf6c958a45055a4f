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
//! # git-media Git Integration Layer
//!
//! Hooks the media store into standard git workflows:
//!
//! - **Pointer records**: the 41 bytes (`<sha1>\n`) git stores in place of
//!   a media file
//! - **Clean filter**: content in, pointer out, content kept in the store
//! - **Smudge filter**: pointer in, content out, pulled from the remote if
//!   needed
//! - **Repository access**: git directory discovery, git config as a
//!   settings source, and the scan for tracked pointers
//! - **Installation**: filter registration and `.gitattributes` patterns
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gitmedia_config::ConfigLoader;
//! use gitmedia_git::{FilterDriver, MediaRepo};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = MediaRepo::discover(".")?;
//! let config = repo.load_config(&ConfigLoader::new())?;
//! let driver = FilterDriver::from_config(repo.store(), &config);
//!
//! let mut pointer = Vec::new();
//! driver.clean("hello.txt", &b"hello"[..], &mut pointer).await?;
//! assert_eq!(pointer, b"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\n");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod install;
pub mod pointer;
pub mod repo;

pub use error::{GitError, GitResult};
pub use filter::{CleanOutcome, FilterDriver, SmudgeOutcome};
pub use install::{install, is_installed, track_pattern, tracked_patterns, uninstall, untrack_pattern};
pub use pointer::{Pointer, POINTER_LEN};
pub use repo::{GitConfigSource, MediaRepo, TrackedMedia};
