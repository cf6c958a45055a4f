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
//! Configuration for git-media
//!
//! Settings are stored in git config under the `git-media.` section and may be
//! overridden with `GIT_MEDIA_*` environment variables. They are resolved once
//! per invocation into a [`MediaConfig`], which selects at most one remote
//! transport via the [`TransportConfig`] enum.
//!
//! # Example
//!
//! ```
//! use gitmedia_config::{ConfigLoader, MapSource, TransportKind};
//!
//! let source = MapSource::new()
//!     .with("git-media.transport", "local")
//!     .with("git-media.localpath", "/srv/media");
//!
//! let config = ConfigLoader::new().resolve(&source).unwrap();
//! assert_eq!(config.require_transport().unwrap().kind(), TransportKind::Local);
//! ```

pub mod error;
pub mod loader;
pub mod netrc;
pub mod schema;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use netrc::{Netrc, NetrcEntry};
pub use schema::*;
pub use source::{ConfigSource, EnvOverlay, MapSource};
pub use validation::Validator;
