//! Hardware (MAC) address in canonical form.
//!
//! Accepted inputs, any case:
//! - `aa:bb:cc:dd:ee:ff` / `aa-bb-cc-dd-ee-ff`
//! - `aabb.ccdd.eeff`
//! - `aabbccddeeff`
//!
//! The canonical form is uppercase, colon-separated (`AA:BB:CC:DD:EE:FF`), so
//! two spellings of the same device always compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CampusNetError, Result};

/// Normalized 48-bit hardware address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HardwareAddress(String);

impl HardwareAddress {
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        let digits: String = if s.contains(':') {
            split_groups(s, ':', 6, 2)?
        } else if s.contains('-') {
            split_groups(s, '-', 6, 2)?
        } else if s.contains('.') {
            split_groups(s, '.', 3, 4)?
        } else {
            s.to_string()
        };

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(raw));
        }

        let upper = digits.to_ascii_uppercase();
        let mut out = String::with_capacity(17);
        for (i, c) in upper.chars().enumerate() {
            if i > 0 && i % 2 == 0 {
                out.push(':');
            }
            out.push(c);
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split_groups(s: &str, sep: char, groups: usize, width: usize) -> Result<String> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != groups || parts.iter().any(|p| p.len() != width) {
        return Err(invalid(s));
    }
    Ok(parts.concat())
}

fn invalid(raw: &str) -> CampusNetError {
    CampusNetError::BadRequest(format!("invalid hardware address: {raw}"))
}

impl FromStr for HardwareAddress {
    type Err = CampusNetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HardwareAddress {
    type Error = CampusNetError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<HardwareAddress> for String {
    fn from(addr: HardwareAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
