//! Quote identity hashing

use sha2::{Digest, Sha256};

use crate::matcher::normalize_whitespace;

/// Lowercase hex SHA-256 of the quote with whitespace collapsed and trimmed.
/// Case is kept: only whitespace edits leave the hash unchanged.
pub fn quote_hash(quote: &str) -> String {
    let digest = Sha256::digest(normalize_whitespace(quote).as_bytes());
    format!("{:x}", digest)
}
