//! Hashing utilities for identifiers and configuration signatures.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Add multiple strings to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Add a numeric component.
    pub fn update_u64(&mut self, n: u64) -> &mut Self {
        self.hasher.update(n.to_le_bytes());
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and return the first `len` hex characters.
    pub fn finish_prefix(self, len: usize) -> String {
        let mut hex = self.finish();
        hex.truncate(len);
        hex
    }
}

/// Short hash of a sorted list of configuration names.
///
/// Used as the last-resort distinguisher between targets that are otherwise
/// identical.
pub fn configurations_hash<'a>(configurations: impl IntoIterator<Item = &'a str>) -> String {
    let mut sorted: Vec<&str> = configurations.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut fp = Fingerprint::new();
    fp.update_strs(sorted);
    fp.finish_prefix(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        let fp1 = {
            let mut fp = Fingerprint::new();
            fp.update_str("hello").update_str("world");
            fp.finish()
        };

        let fp2 = {
            let mut fp = Fingerprint::new();
            fp.update_str("hello").update_str("world");
            fp.finish()
        };

        let fp3 = {
            let mut fp = Fingerprint::new();
            fp.update_str("hello").update_str("different");
            fp.finish()
        };

        assert_eq!(fp1, fp2);
        assert_ne!(fp1, fp3);
    }

    #[test]
    fn test_configurations_hash_is_order_independent() {
        let a = configurations_hash(["ios-arm64-sim", "ios-x86_64-sim"]);
        let b = configurations_hash(["ios-x86_64-sim", "ios-arm64-sim"]);
        let c = configurations_hash(["ios-arm64"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 5);
    }
}
