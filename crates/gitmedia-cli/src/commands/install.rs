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
//! Filter driver registration

use crate::output;
use crate::session::open_repo;
use anyhow::{Context, Result};
use clap::Args;
use gitmedia_git::install::{CLEAN_COMMAND, SMUDGE_COMMAND};

#[derive(Debug, Args)]
pub struct InstallCmd {
    /// Overwrite a filter.media registration that points elsewhere
    #[arg(short, long)]
    pub force: bool,
}

impl InstallCmd {
    pub fn execute(self) -> Result<()> {
        let repo = open_repo()?;
        gitmedia_git::install(&repo, self.force).context("Failed to install filter driver")?;

        output::success("Installed the media filter");
        output::detail("filter.media.clean", CLEAN_COMMAND);
        output::detail("filter.media.smudge", SMUDGE_COMMAND);
        output::info("Route files through it with 'git media track <PATTERN>'");
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct UninstallCmd {}

impl UninstallCmd {
    pub fn execute(self) -> Result<()> {
        let repo = open_repo()?;
        if gitmedia_git::uninstall(&repo).context("Failed to remove filter driver")? {
            output::success("Removed the media filter");
        } else {
            output::info("The media filter was not installed");
        }
        Ok(())
    }
}
