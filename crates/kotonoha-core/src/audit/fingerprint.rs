//! One-way text fingerprints

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn deterministic_and_distinct() {
        let long_a = "あ".repeat(10_000);
        let mut long_b = long_a.clone();
        long_b.push('。');

        let samples = ["", " ", "水 ぬるく", "水ぬるく", "🍵", long_a.as_str(), long_b.as_str()];
        for (i, a) in samples.iter().enumerate() {
            let digest = fingerprint(a);
            assert_eq!(digest, fingerprint(a));
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert_ne!(&digest, a);
            for b in &samples[i + 1..] {
                assert_ne!(digest, fingerprint(b), "{a:?} vs {b:?}");
            }
        }
    }
}
