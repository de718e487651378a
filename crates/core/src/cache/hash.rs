//! Cache entry key generation.

use sha2::{Digest, Sha256};

/// Compute the key of a cache entry from its request method and absolute URL.
///
/// The method is upper-cased first so `get` and `GET` address the same entry.
pub fn compute_entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_entry_key("GET", "https://example.com/index.html");
        let hash2 = compute_entry_key("GET", "https://example.com/index.html");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case_insensitive() {
        let upper = compute_entry_key("GET", "https://example.com/");
        let lower = compute_entry_key("get", "https://example.com/");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_hash_different_url() {
        let root = compute_entry_key("GET", "https://example.com/");
        let index = compute_entry_key("GET", "https://example.com/index.html");
        assert_ne!(root, index);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_entry_key("GET", "https://example.com/");
        let head = compute_entry_key("HEAD", "https://example.com/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_entry_key("GET", "https://example.com/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
