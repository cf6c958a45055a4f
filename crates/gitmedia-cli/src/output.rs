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
//! Shared output formatting for CLI commands.
//!
//! Report output goes to stdout; errors go to stderr. The filter commands
//! never call into this module since their stdout carries file content.

use console::style;
use indicatif::HumanBytes;

/// Print a success message with a green checkmark.
pub fn success(msg: &str) {
    println!("{} {}", style("✔").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✘").red().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").cyan(), msg);
}

pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

/// Print a section header.
pub fn header(msg: &str) {
    println!("{}", style(msg).bold().underlined());
}

/// Print an indented key-value line with the value highlighted.
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Print an indented list item.
pub fn item(msg: &str) {
    println!("  {}", msg);
}

/// Human readable byte count, e.g. `1.50 MiB`.
pub fn bytes(n: u64) -> String {
    HumanBytes(n).to_string()
}
