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
//! Read-only reports: status and list

use crate::output;
use crate::progress::ProgressTracker;
use crate::session::Session;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct StatusCmd {
    /// Only print counts
    #[arg(short, long)]
    pub short: bool,
}

impl StatusCmd {
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let session = Session::open()?;
        let tracked = session.tracked()?;

        let spinner = ProgressTracker::new(quiet).spinner("Checking remote");
        let status = session
            .coordinator()
            .status(&tracked)
            .await
            .context("status failed")?;
        spinner.finish_and_clear();

        if self.short {
            println!(
                "unpushed: {} ({})",
                status.unpushed.len(),
                output::bytes(status.unpushed_bytes())
            );
            println!("unexpanded: {}", status.unexpanded.len());
            println!("missing: {}", status.missing.len());
            return Ok(());
        }

        if status.is_clean() {
            output::success("Media is in sync");
            return Ok(());
        }

        if !status.unpushed.is_empty() {
            output::header("Unpushed media");
            for object in &status.unpushed {
                output::item(&format!("{}  {}", object.oid, output::bytes(object.size)));
            }
        }
        if !status.unexpanded.is_empty() {
            output::header("Not expanded");
            for media in &status.unexpanded {
                output::item(&format!("{}  {}", media.oid, media.path.display()));
            }
        }
        if !status.missing.is_empty() {
            output::header("Missing locally");
            for oid in &status.missing {
                output::item(&oid.to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ListCmd {}

impl ListCmd {
    pub async fn execute(self) -> Result<()> {
        let session = Session::open()?;
        let tracked = session.tracked()?;
        let entries = session
            .coordinator()
            .list(&tracked)
            .await
            .context("Failed to list the media store")?;

        if entries.is_empty() {
            output::info("No media in the local store");
            return Ok(());
        }

        let total: u64 = entries.iter().map(|e| e.size).sum();
        for entry in &entries {
            let paths: Vec<String> = entry.paths.iter().map(|p| p.display().to_string()).collect();
            println!(
                "{}  {:>10}  {}",
                entry.oid,
                output::bytes(entry.size),
                paths.join(", ")
            );
        }
        output::detail(
            "Total",
            &format!("{} object(s), {}", entries.len(), output::bytes(total)),
        );
        Ok(())
    }
}
