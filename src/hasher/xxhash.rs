use std::hash::Hasher as _;
use twox_hash::XxHash64;

pub type Fingerprint = u64;

/// Hash the first `prefix_chars` characters of `content`.
///
/// Anything past the prefix never participates, so two documents with the
/// same opening share a fingerprint.
pub fn fingerprint(content: &str, prefix_chars: usize) -> Fingerprint {
    let end = content
        .char_indices()
        .nth(prefix_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(content.len());
    hash_data(&content.as_bytes()[..end])
}

pub fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_bounds_the_fingerprint() {
        let opening = "開".repeat(100);
        let a = format!("{}ending one", opening);
        let b = format!("{}a different ending", opening);

        assert_eq!(fingerprint(&a, 100), fingerprint(&b, 100));
        assert_ne!(fingerprint(&a, 101), fingerprint(&b, 101));
    }

    #[test]
    fn test_short_content_uses_whole_text() {
        assert_eq!(fingerprint("abc", 10_000), hash_data(b"abc"));
        assert_ne!(fingerprint("abc", 10_000), fingerprint("abd", 10_000));
    }
}
