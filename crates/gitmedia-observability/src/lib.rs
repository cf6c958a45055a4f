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
//! git-media Observability Module
//!
//! Structured logging for the `git-media` binary.
//!
//! # Features
//!
//! - **Multiple Output Formats**: Pretty, compact and JSON output
//! - **Environment-based Filtering**: `GIT_MEDIA_LOG`, then `RUST_LOG`
//! - **Stderr only**: a filter process uses stdout as its data channel, so
//!   log output never goes there
//!
//! # Example
//!
//! ```no_run
//! use gitmedia_observability::{init_tracing_with_config, LogConfig, LogFormat};
//!
//! let config = LogConfig::from_verbosity(1, false).with_format(LogFormat::Json);
//! init_tracing_with_config(config)?;
//! tracing::info!("ready");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LEVEL_ENV};
pub use initialization::{init_tracing, init_tracing_with_config};
