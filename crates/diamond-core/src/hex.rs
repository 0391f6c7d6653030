//! Minimal fixed-width hex codec shared by selectors, addresses, hashes and slot words.

use crate::error::CoreError;

pub fn encode(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Decode exactly `N` bytes from a hex string, with or without a `0x` prefix.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], CoreError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.len() % 2 != 0 {
        return Err(CoreError::InvalidHex(s.to_string()));
    }
    if digits.len() / 2 != N {
        return Err(CoreError::InvalidLength {
            expected: N,
            found: digits.len() / 2,
        });
    }

    let mut bytes = [0u8; N];
    ::hex::decode_to_slice(digits, &mut bytes).map_err(|_| CoreError::InvalidHex(s.to_string()))?;
    Ok(bytes)
}
