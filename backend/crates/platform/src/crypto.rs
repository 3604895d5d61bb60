//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use sha1::{Digest, Sha1};

/// Compute SHA-1 and return lowercase hex
///
/// Used for request signatures of third-party APIs that still mandate SHA-1
/// (e.g. Cloudinary upload signing). Not for credentials.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex_lower(&hasher.finalize())
}

/// Encode bytes as base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 to bytes
///
/// Accepts both padded and unpadded input.
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let trimmed = s.trim();
    general_purpose::STANDARD
        .decode(trimmed)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(trimmed.trim_end_matches('=')))
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
