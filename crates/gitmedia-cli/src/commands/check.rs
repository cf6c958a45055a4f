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
//! Integrity check of the media store

use crate::output;
use crate::progress::ProgressTracker;
use crate::session::Session;
use anyhow::{bail, Context, Result};
use clap::Args;
use gitmedia_sync::CheckOutcome;

#[derive(Debug, Args)]
pub struct CheckCmd {}

impl CheckCmd {
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let session = Session::open()?;
        let observer = ProgressTracker::new(quiet).observer();
        let report = session
            .checker()
            .check_with(&observer)
            .await
            .context("check failed")?;

        for (oid, outcome) in &report.results {
            if *outcome != CheckOutcome::Verified {
                output::item(&format!("{}  {}", oid, outcome));
            }
        }

        let unrecoverable = report.unrecoverable().count();
        if unrecoverable > 0 {
            bail!(
                "{} object(s) are damaged and could not be re-downloaded",
                unrecoverable
            );
        }
        output::success(&format!(
            "{} object(s) verified, {} repaired",
            report.verified(),
            report.repaired()
        ));
        Ok(())
    }
}
