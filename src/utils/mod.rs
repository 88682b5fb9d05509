//! Small value helpers shared across resources and data sources.

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};

/// Case-insensitive string equality.
///
/// Comparisons against user-supplied names (projects, repositories, groups)
/// are case-insensitive throughout the Azure DevOps API surface.
#[must_use]
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Encode a string as UTF-16 little-endian hex.
///
/// Branch name segments inside git security tokens use this encoding.
#[must_use]
pub fn encode_utf16_hex(message: &str) -> String {
    let mut out = String::with_capacity(message.len() * 4);
    for unit in message.encode_utf16() {
        let [lo, hi] = unit.to_le_bytes();
        out.push_str(&format!("{lo:02x}{hi:02x}"));
    }
    out
}

/// Decode a UTF-16 little-endian hex string produced by [`encode_utf16_hex`].
pub fn decode_utf16_hex(message: &str) -> Result<String> {
    if message.len() % 4 != 0 {
        bail!("hex string length must be a multiple of 4, got {}", message.len());
    }

    let mut units = Vec::with_capacity(message.len() / 4);
    for chunk in message.as_bytes().chunks(4) {
        let chunk = std::str::from_utf8(chunk).context("hex string is not ASCII")?;
        let lo = u16::from_str_radix(&chunk[..2], 16).context("invalid hex digit")?;
        let hi = u16::from_str_radix(&chunk[2..], 16).context("invalid hex digit")?;
        units.push(lo | (hi << 8));
    }

    String::from_utf16(&units).context("decoded bytes are not valid UTF-16")
}

/// Build a stable identifier for a data-source result set.
///
/// The identifier is derived from the content that shaped the result so the
/// host sees a change only when the result set changes:
/// `{prefix}#{hex(sha256(parts joined by '-'))}`.
#[must_use]
pub fn content_hash_id(prefix: &str, parts: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("-").as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("{prefix}#{hex}")
}
