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
//! Remote synchronization: sync, download, clear

use crate::output;
use crate::progress::ProgressTracker;
use crate::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use gitmedia_sync::SyncReport;

#[derive(Debug, Args)]
pub struct SyncCmd {}

impl SyncCmd {
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let session = Session::open()?;
        let tracked = session.tracked()?;
        let coordinator = session
            .coordinator()
            .with_observer(ProgressTracker::new(quiet).observer());

        let report = coordinator.sync(&tracked).await.context("sync failed")?;
        print_report(&report);
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DownloadCmd {}

impl DownloadCmd {
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let session = Session::open()?;
        let tracked = session.tracked()?;
        let coordinator = session
            .coordinator()
            .with_observer(ProgressTracker::new(quiet).observer());

        let report = coordinator.download(&tracked).await.context("download failed")?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    for oid in &report.pushed {
        output::item(&format!("uploaded   {}", oid));
    }
    for oid in &report.pulled {
        output::item(&format!("downloaded {}", oid));
    }
    for path in &report.expanded {
        output::item(&format!("expanded   {}", path.display()));
    }
    for oid in &report.unavailable {
        output::warning(&format!("{} is not available locally or on the remote", oid));
    }

    if report.pushed.is_empty() && report.pulled.is_empty() && report.expanded.is_empty() {
        output::success("Media is up to date");
    } else {
        output::success(&format!(
            "Uploaded {}, downloaded {}, expanded {}",
            report.pushed.len(),
            report.pulled.len(),
            report.expanded.len()
        ));
    }
}

#[derive(Debug, Args)]
pub struct ClearCmd {}

impl ClearCmd {
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let session = Session::open()?;
        let spinner = ProgressTracker::new(quiet).spinner("Checking remote");
        let report = session.coordinator().clear().await.context("clear failed")?;
        spinner.finish_and_clear();

        for oid in &report.removed {
            output::item(&format!("removed {}", oid));
        }
        output::success(&format!(
            "Removed {} object(s), freed {}",
            report.removed.len(),
            output::bytes(report.freed_bytes)
        ));
        if report.kept > 0 {
            output::info(&format!(
                "Kept {} object(s) not yet on the remote; run 'git media sync' first",
                report.kept
            ));
        }
        Ok(())
    }
}
