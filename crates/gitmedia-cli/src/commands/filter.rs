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
//! Git filter driver commands (clean and smudge)
//!
//! Both read stdin and write stdout. Nothing else may be printed to stdout.

use crate::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use gitmedia_git::FilterDriver;
use tokio::io::{stdin, stdout};

#[derive(Debug, Args)]
pub struct CleanCmd {
    /// Path of the file being cleaned, as passed by git (%f)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,
}

impl CleanCmd {
    pub async fn execute(self) -> Result<()> {
        let session = Session::open()?;
        let driver = FilterDriver::from_config(session.store(), &session.config);
        let path = self.file.as_deref().unwrap_or("<stdin>");

        driver
            .clean(path, stdin(), &mut stdout())
            .await
            .with_context(|| format!("clean filter failed for {}", path))?;
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct SmudgeCmd {
    /// Path of the file being checked out, as passed by git (%f)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,
}

impl SmudgeCmd {
    pub async fn execute(self) -> Result<()> {
        let session = Session::open()?;
        let driver = FilterDriver::from_config(session.store(), &session.config);
        let path = self.file.as_deref().unwrap_or("<stdin>");

        driver
            .smudge(path, stdin(), &mut stdout())
            .await
            .with_context(|| format!("smudge filter failed for {}", path))?;
        Ok(())
    }
}
