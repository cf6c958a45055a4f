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

mod commands;
mod output;
mod progress;
mod session;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use gitmedia_observability::{init_tracing_with_config, LogConfig, LogFormat};
use std::io::{self, IsTerminal};

#[derive(Parser)]
#[command(name = "git-media")]
#[command(version, about = "Keep large media out of git, in a content-addressed cache")]
#[command(
    long_about = "git-media replaces media files in git with small pointers and keeps their content
in a cache under .git/media, synchronized with a remote store (local directory, scp, S3,
Atmos, Drive, hashstash or WebDAV)."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (pretty|compact|json)
    #[arg(long, global = true, value_name = "FORMAT", default_value = "compact")]
    log_format: LogFormat,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean filter: content on stdin, pointer on stdout (git add)
    FilterClean(CleanCmd),

    /// Smudge filter: pointer on stdin, content on stdout (git checkout)
    FilterSmudge(SmudgeCmd),

    /// Upload unpushed media, download missing media, expand pointers
    Sync(SyncCmd),

    /// Download missing media and expand pointers
    Download(DownloadCmd),

    /// Show unpushed, unexpanded and missing media
    Status(StatusCmd),

    /// List media in the local store
    List(ListCmd),

    /// Delete local copies of media the remote already has
    Clear(ClearCmd),

    /// Verify stored media and re-download damaged objects
    Check(CheckCmd),

    /// Register the media filter in this repository
    Install(InstallCmd),

    /// Remove the media filter registration
    Uninstall(UninstallCmd),

    /// Route a file pattern through the media filter
    Track(TrackCmd),

    /// Stop routing a file pattern through the media filter
    Untrack(UntrackCmd),

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        _ => {
            output::error(&format!("Invalid color option: {}", cli.color));
            std::process::exit(1);
        }
    }

    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_format(cli.log_format)
        .with_timestamps(cli.verbose > 0)
        .with_color(cli.color != "never" && io::stderr().is_terminal());
    // A subscriber may already be installed when embedded; keep going without ours.
    init_tracing_with_config(log_config).ok();

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::FilterClean(cmd) => cmd.execute().await,
        Commands::FilterSmudge(cmd) => cmd.execute().await,
        Commands::Sync(cmd) => cmd.execute(quiet).await,
        Commands::Download(cmd) => cmd.execute(quiet).await,
        Commands::Status(cmd) => cmd.execute(quiet).await,
        Commands::List(cmd) => cmd.execute().await,
        Commands::Clear(cmd) => cmd.execute(quiet).await,
        Commands::Check(cmd) => cmd.execute(quiet).await,
        Commands::Install(cmd) => cmd.execute(),
        Commands::Uninstall(cmd) => cmd.execute(),
        Commands::Track(cmd) => cmd.execute(),
        Commands::Untrack(cmd) => cmd.execute(),
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn print_version() {
    println!("git-media {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "git-media", &mut io::stdout());
}
