//! Blocking entry points that run on the calling thread.
//!
//! These use a shared [`HashComputer`] with the default DCT transform. A
//! `"0"` result is ambiguous: the image may hash to zero, or the file may be
//! missing or undecodable. Use [`HashComputer::compute`] or the asynchronous
//! path on [`ImageHasher`](crate::ImageHasher) to tell them apart.

use once_cell::sync::Lazy;
use std::path::Path;

use crate::fingerprint::EncodedFingerprint;
use crate::processing::HashComputer;

static DEFAULT_COMPUTER: Lazy<HashComputer> = Lazy::new(HashComputer::default);

/// Fingerprint `path`, blocking until done. Any failure yields `"0"`.
pub fn image_hash_sync<P: AsRef<Path>>(path: P) -> EncodedFingerprint {
    DEFAULT_COMPUTER.compute_encoded(path.as_ref())
}

/// Old lowercase name for [`image_hash_sync`]
#[deprecated(note = "use image_hash_sync")]
pub fn imagehash<P: AsRef<Path>>(path: P) -> EncodedFingerprint {
    image_hash_sync(path)
}

/// Fingerprint truncated to its lower 32 bits. Any failure yields `0`.
///
/// The upper half of the fingerprint is lost, so distances computed from
/// these values are meaningless for most purposes.
#[deprecated(note = "loses the upper 32 bits; use image_hash_sync")]
pub fn old_hash<P: AsRef<Path>>(path: P) -> u32 {
    DEFAULT_COMPUTER
        .compute(path.as_ref())
        .map(|fingerprint| fingerprint.truncated())
        .unwrap_or(0)
}
