//! Function selectors - the fixed-width keys calls are routed by.

use crate::error::CoreError;
use crate::hex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of a selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// A 4-byte big-endian identifier naming one callable entry point.
///
/// Selectors are the keys of the routing registry: at most one facet owns
/// a given selector at any time. Serialized as a `0x`-prefixed hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector([u8; SELECTOR_LEN]);

impl Selector {
    /// The all-zero selector. Only used as filler in unoccupied slot cells.
    pub const ZERO: Selector = Selector([0u8; SELECTOR_LEN]);

    /// Create a selector from raw bytes.
    pub const fn from_bytes(bytes: [u8; SELECTOR_LEN]) -> Self {
        Selector(bytes)
    }

    /// Create a selector from its big-endian integer form.
    pub const fn from_u32(value: u32) -> Self {
        Selector(value.to_be_bytes())
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; SELECTOR_LEN] {
        &self.0
    }

    /// Big-endian integer form.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        hex::decode_fixed::<SELECTOR_LEN>(s).map(Selector)
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self.to_hex())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::from_hex(s)
    }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self {
        Selector::from_u32(value)
    }
}

impl TryFrom<String> for Selector {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Selector::from_hex(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_hex()
    }
}
