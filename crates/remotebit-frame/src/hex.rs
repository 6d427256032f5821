//! Hex text for frames on the command line and in logs.

use crate::error::{FrameError, Result};

/// Lowercase hex without separators.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse hex text. Whitespace, `:` and `-` separators and a `0x` prefix are
/// accepted.
pub fn from_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':' && *c != '-')
        .collect();

    hex::decode(&digits).map_err(|err| FrameError::InvalidHex(format!("{input:?}: {err}")))
}
