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
//! Track/untrack file patterns

use crate::output;
use crate::session::open_repo;
use anyhow::{Context, Result};
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct TrackCmd {
    /// File pattern to track (e.g., "*.psd", "*.mp4"); lists patterns if omitted
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,
}

impl TrackCmd {
    pub fn execute(self) -> Result<()> {
        let repo = open_repo()?;
        let workdir = repo.workdir()?;

        let Some(pattern) = self.pattern else {
            let patterns = gitmedia_git::tracked_patterns(workdir)?;
            if patterns.is_empty() {
                output::info("No tracked patterns found");
                output::item("Use 'git media track <PATTERN>' to start tracking media files");
            } else {
                output::header("Tracked patterns");
                for pattern in patterns {
                    output::item(&style(pattern).yellow().to_string());
                }
            }
            return Ok(());
        };

        if gitmedia_git::track_pattern(workdir, &pattern).context("Failed to update .gitattributes")? {
            output::success(&format!("Tracking {}", pattern));
        } else {
            output::info(&format!("{} is already tracked", pattern));
        }
        if !gitmedia_git::is_installed(&repo)? {
            output::warning("The media filter is not installed; run 'git media install'");
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct UntrackCmd {
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
}

impl UntrackCmd {
    pub fn execute(self) -> Result<()> {
        let repo = open_repo()?;
        let workdir = repo.workdir()?;

        if gitmedia_git::untrack_pattern(workdir, &self.pattern)
            .context("Failed to update .gitattributes")?
        {
            output::success(&format!("Untracked {}", self.pattern));
        } else {
            output::info(&format!("{} was not tracked", self.pattern));
        }
        Ok(())
    }
}
