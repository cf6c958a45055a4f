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
//! SHA-1 object identity
//!
//! Every media object is named by the SHA-1 of its exact bytes, rendered as
//! 40 lowercase hex digits. Parsing accepts either case.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an oid in hex digits
pub const OID_HEX_LEN: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid object id '{0}': expected 40 hex digits")]
pub struct InvalidOid(pub String);

/// Content identity of a media object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid([u8; 20]);

impl Oid {
    /// Hash a complete in-memory buffer
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = OidHasher::new();
        hasher.update(data);
        hasher.finish()
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Oid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Two-digit directory the object is sharded under
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// Whether `s` is exactly 40 hex digits
    pub fn is_hex(s: &[u8]) -> bool {
        s.len() == OID_HEX_LEN && s.iter().all(u8::is_ascii_hexdigit)
    }
}

impl FromStr for Oid {
    type Err = InvalidOid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Oid::is_hex(s.as_bytes()) {
            return Err(InvalidOid(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidOid(s.to_string()))?;
        Ok(Oid(bytes))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental SHA-1 accumulator for streamed content
#[derive(Clone, Default)]
pub struct OidHasher(Sha1);

impl OidHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finish(self) -> Oid {
        Oid(self.0.finalize().into())
    }
}

impl fmt::Debug for OidHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OidHasher")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            Oid::hash(b"hello").to_string(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        assert_eq!(
            Oid::hash(b"").to_string(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(Oid::hash(b"hello").shard(), "aa");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let oid: Oid = "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D".parse().unwrap();
        assert_eq!(oid, Oid::hash(b"hello"));
        assert_eq!(oid.to_string(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("aaf4c61d".parse::<Oid>().is_err());
        assert!("zaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d".parse::<Oid>().is_err());
        assert!("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\n".parse::<Oid>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let oid = Oid::hash(b"hello");
        let json = serde_json::to_string(&oid).unwrap();
        assert_eq!(json, "\"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\"");
        assert_eq!(serde_json::from_str::<Oid>(&json).unwrap(), oid);
    }

    proptest! {
        #[test]
        fn prop_streaming_matches_oneshot(data in proptest::collection::vec(any::<u8>(), 0..4096), split in 0usize..4096) {
            let split = split.min(data.len());
            let mut hasher = OidHasher::new();
            hasher.update(&data[..split]);
            hasher.update(&data[split..]);
            prop_assert_eq!(hasher.finish(), Oid::hash(&data));
        }

        #[test]
        fn prop_display_round_trips(bytes in any::<[u8; 20]>()) {
            let oid = Oid::from_bytes(bytes);
            prop_assert_eq!(oid.to_string().parse::<Oid>().unwrap(), oid);
        }
    }
}
