use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - source (verifier id or rule id)
/// - code
/// - key (sequence id for chain violations, joined targets for rules)
pub fn fingerprint_for_violation(source: &str, code: &str, key: &str) -> String {
    let canonical = [source, code, key].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
