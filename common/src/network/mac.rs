//! # MAC Address Model
//!
//! Hardware addresses as typed by users: six hexadecimal pairs separated by
//! colons (`AA:BB:CC:DD:EE:FF`) or hyphens (`AA-BB-CC-DD-EE-FF`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MAC_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacParseError {
    #[error("expected {MAC_LEN} hex pairs, found {0}")]
    GroupCount(usize),
    #[error("group '{0}' is not a two-digit hex pair")]
    GroupLength(String),
    #[error("group '{0}' contains a non-hex character")]
    NotHex(String),
}

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    pub const fn new(octets: [u8; MAC_LEN]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

impl From<[u8; MAC_LEN]> for MacAddress {
    fn from(octets: [u8; MAC_LEN]) -> Self {
        Self(octets)
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    /// Parses `AA:BB:CC:DD:EE:FF` or `AA-BB-CC-DD-EE-FF` (case-insensitive).
    ///
    /// Mixed separators are accepted as long as every group is a hex pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.trim().split([':', '-']).collect();
        if groups.len() != MAC_LEN {
            return Err(MacParseError::GroupCount(groups.len()));
        }

        let mut octets = [0u8; MAC_LEN];
        for (slot, group) in octets.iter_mut().zip(groups) {
            if group.len() != 2 {
                return Err(MacParseError::GroupLength(group.to_string()));
            }
            if !group.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MacParseError::NotHex(group.to_string()));
            }
            *slot = u8::from_str_radix(group, 16)
                .map_err(|_| MacParseError::NotHex(group.to_string()))?;
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
