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
//! SCP/SSH transport
//!
//! Shells out to the system `ssh` and `scp` clients, so authentication uses
//! the user's agent and `~/.ssh/config`. Objects are stored flat under the
//! configured remote directory. Prompts are disabled with `BatchMode`; a
//! transport that would need interactive input fails instead of hanging a
//! filter process.

use crate::error::{TransportError, TransportResult};
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use gitmedia_config::ScpConfig;
use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

const BACKEND: &str = "scp";

/// Exit status ssh uses for its own connection errors
const SSH_CONNECTION_FAILURE: i32 = 255;

#[derive(Debug, Clone)]
pub struct ScpTransport {
    config: ScpConfig,
    ssh_program: OsString,
    scp_program: OsString,
}

impl ScpTransport {
    pub fn new(config: ScpConfig) -> Self {
        ScpTransport {
            config,
            ssh_program: "ssh".into(),
            scp_program: "scp".into(),
        }
    }

    /// Use alternative `ssh`/`scp` executables
    pub fn with_programs(mut self, ssh: impl Into<OsString>, scp: impl Into<OsString>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.config.user, self.config.host)
    }

    fn remote_path(&self, oid: &Oid) -> String {
        format!("{}/{}", self.config.path.trim_end_matches('/'), oid)
    }

    fn ssh_args(&self, oid: &Oid) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-o".into(), "BatchMode=yes".into()];
        if let Some(port) = self.config.port {
            args.push("-p".into());
            args.push(port.to_string().into());
        }
        args.push(self.destination().into());
        args.push("--".into());
        args.push(format!("test -f {}", shell_quote(&self.remote_path(oid))).into());
        args
    }

    fn scp_args(&self, from: OsString, to: OsString) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-q".into(), "-B".into()];
        if let Some(port) = self.config.port {
            args.push("-P".into());
            args.push(port.to_string().into());
        }
        args.push(from);
        args.push(to);
        args
    }

    fn remote_spec(&self, oid: &Oid) -> OsString {
        format!("{}:{}", self.destination(), self.remote_path(oid)).into()
    }

    async fn run(&self, program: &OsString, args: Vec<OsString>) -> TransportResult<Output> {
        debug!(program = ?program, args = ?args, "Running transfer command");
        Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TransportError::backend(BACKEND, format!("failed to run {:?}: {}", program, e))
            })
    }
}

fn failure(output: &Output) -> TransportError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") || lower.contains("host key verification failed") {
        TransportError::auth_failed(BACKEND, stderr)
    } else if output.status.code() == Some(SSH_CONNECTION_FAILURE)
        || lower.contains("connection refused")
        || lower.contains("connection timed out")
        || lower.contains("could not resolve")
    {
        TransportError::unreachable(BACKEND, stderr)
    } else {
        TransportError::backend(BACKEND, stderr)
    }
}

/// Quote `s` for a POSIX shell on the remote side
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[async_trait]
impl Transport for ScpTransport {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        let output = self.run(&self.ssh_program, self.ssh_args(oid)).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(failure(&output)),
        }
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        let args = self.scp_args(self.remote_spec(oid), dest.as_os_str().to_owned());
        let output = self.run(&self.scp_program, args).await?;
        if output.status.success() {
            return Ok(());
        }
        if String::from_utf8_lossy(&output.stderr).contains("No such file") {
            return Err(TransportError::NotFound(*oid));
        }
        Err(failure(&output))
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        let args = self.scp_args(src.as_os_str().to_owned(), self.remote_spec(oid));
        let output = self.run(&self.scp_program, args).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(failure(&output))
        }
    }
}
