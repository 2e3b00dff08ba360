//! Content hashes for stored assets.
//!
//! Hashes are SHA-256 digests stored as lowercase hex. In URLs they travel as unpadded
//! URL-safe base64 of the raw 32-byte digest; standard base64 is accepted when decoding.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

const DIGEST_LEN: usize = 32;

/// Compute a SHA-256 hex digest over the concatenation of `parts`.
#[must_use]
pub fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Encode a stored hex digest as the URL path segment used by the content routes.
///
/// Returns `None` if `digest` is not the hex of a 32-byte digest.
#[must_use]
pub fn to_url_segment(digest: &str) -> Option<String> {
    let bytes = hex::decode(digest).ok()?;
    (bytes.len() == DIGEST_LEN).then(|| URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode a URL path segment back into the stored hex digest.
///
/// Returns `None` for anything that is not base64 of exactly 32 bytes.
#[must_use]
pub fn from_url_segment(segment: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .or_else(|_| STANDARD.decode(segment))
        .ok()?;
    if bytes.len() != DIGEST_LEN {
        return None;
    }
    Some(hex::encode(bytes))
}
