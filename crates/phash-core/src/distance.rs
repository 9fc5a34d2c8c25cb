use crate::fingerprint::{decode, FINGERPRINT_BITS};

/// Hamming distance between two encoded fingerprints.
///
/// Both sides go through the permissive [`decode`], so a malformed string is
/// compared as `0`. The result is always in `0..=64`.
pub fn hamming_distance(a: &str, b: &str) -> u32 {
    let distance = decode(a).distance(&decode(b));
    debug_assert!(distance <= FINGERPRINT_BITS);
    distance
}
