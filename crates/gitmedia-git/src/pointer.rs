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
//! Pointer records
//!
//! What git stores in place of a media file: the object's hex digest and a
//! newline, exactly 41 bytes.
//!
//! ```text
//! aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d
//! ```
//!
//! Any input of exactly this shape is treated as a pointer, never as
//! payload, which keeps clean and smudge idempotent.

use gitmedia_storage::oid::OID_HEX_LEN;
use gitmedia_storage::Oid;
use std::fmt;

/// Size of a pointer record in bytes
pub const POINTER_LEN: usize = OID_HEX_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub oid: Oid,
}

impl Pointer {
    pub fn new(oid: Oid) -> Self {
        Pointer { oid }
    }

    /// Whether `bytes` is exactly one pointer record
    pub fn is_pointer(bytes: &[u8]) -> bool {
        bytes.len() == POINTER_LEN
            && bytes[OID_HEX_LEN] == b'\n'
            && Oid::is_hex(&bytes[..OID_HEX_LEN])
    }

    /// Parse a pointer record; `None` for anything else
    ///
    /// Upper-case digests are accepted and normalized.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if !Self::is_pointer(bytes) {
            return None;
        }
        std::str::from_utf8(&bytes[..OID_HEX_LEN])
            .ok()?
            .parse()
            .ok()
            .map(Pointer::new)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.oid.to_hex().into_bytes();
        bytes.push(b'\n');
        bytes
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.oid)
    }
}
