//! Short one-way digest for matched substrings
//!
//! Matched text is hashed the moment it is seen and the raw value is never
//! stored anywhere downstream. The digest is deliberately short: it only
//! needs to be deterministic enough to correlate identical values across
//! findings and audit entries, not collision-proof.

use sha2::{Digest, Sha256};

/// Hex length of the truncated digest
pub const VALUE_HASH_LEN: usize = 12;

/// Compute the truncated SHA-256 digest of a matched substring
///
/// Deterministic: equal inputs always produce equal digests.
///
/// # Examples
///
/// ```
/// use aegis::scanner::hash::short_hash;
///
/// let a = short_hash("123-45-6789");
/// let b = short_hash("123-45-6789");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 12);
/// ```
pub fn short_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex[..VALUE_HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(short_hash("test@example.com"), short_hash("test@example.com"));
    }

    #[test]
    fn test_distinct_inputs_differ() {
        assert_ne!(short_hash("test@example.com"), short_hash("other@example.com"));
    }

    #[test]
    fn test_length() {
        assert_eq!(short_hash("").len(), VALUE_HASH_LEN);
        assert_eq!(short_hash("a very long input string repeated").len(), VALUE_HASH_LEN);
    }

    #[test]
    fn test_no_raw_value_in_digest() {
        let digest = short_hash("SECRETVALUE");
        assert!(!digest.contains("SECRET"));
    }
}
