//! Perceptual image fingerprints.
//!
//! This library turns an image file into a 64-bit DCT-based fingerprint and
//! compares fingerprints by Hamming distance:
//! - Fingerprint encoding to and from decimal strings
//! - Hash computation that never lets a decoder failure escape
//! - Background dispatch with completion handlers on the caller's thread
//! - Blocking and deprecated legacy entry points

// -- External Dependencies --
use log::info;

// -- Standard Library --
use std::path::Path;
use std::sync::Arc;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use distance::hamming_distance;
pub use error::{Error, Result};
#[allow(deprecated)]
pub use facade::{image_hash_sync, imagehash, old_hash};
pub use fingerprint::{decode, encode, EncodedFingerprint, Fingerprint, SENTINEL};
pub use processing::{
    DctTransform, HashComputer, JobDispatcher, JobId, JobState, PerceptualTransform,
};

// -- Public Modules --
pub mod config;
pub mod distance;
pub mod facade;
pub mod fingerprint;
pub mod logging;
pub mod processing;

/// Main entry point: a configured hasher with its own worker pool
#[derive(Debug)]
pub struct ImageHasher {
    config: Config,
    computer: HashComputer,
    dispatcher: JobDispatcher,
}

impl ImageHasher {
    /// Create an ImageHasher with the default DCT transform
    pub fn new(config: Config) -> Result<Self> {
        Self::with_transform(config, Arc::new(DctTransform::new()))
    }

    /// Create an ImageHasher around a custom transform
    pub fn with_transform(config: Config, transform: Arc<dyn PerceptualTransform>) -> Result<Self> {
        config.validate()?;

        let computer = HashComputer::new(transform);
        let dispatcher = JobDispatcher::new(computer.clone(), config.worker_threads())?;

        info!(
            "ImageHasher ready ({} workers, similarity threshold {})",
            config.worker_threads(),
            config.similarity_threshold
        );

        Ok(Self {
            config,
            computer,
            dispatcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Typed result: distinguishes a zero fingerprint from a failure
    pub fn fingerprint(&self, path: impl AsRef<Path>) -> Result<Fingerprint> {
        self.computer.compute(path.as_ref())
    }

    /// Blocking fingerprint; `"0"` on any failure with no error signal
    pub fn image_hash_sync(&self, path: impl AsRef<Path>) -> EncodedFingerprint {
        self.computer.compute_encoded(path.as_ref())
    }

    /// Old lowercase name for [`ImageHasher::image_hash_sync`]
    #[deprecated(note = "use image_hash_sync")]
    pub fn imagehash(&self, path: impl AsRef<Path>) -> EncodedFingerprint {
        self.image_hash_sync(path)
    }

    /// Lower 32 bits of the fingerprint; `0` on any failure
    #[deprecated(note = "loses the upper 32 bits; use image_hash_sync")]
    pub fn old_hash(&self, path: impl AsRef<Path>) -> u32 {
        self.fingerprint(path)
            .map(|fingerprint| fingerprint.truncated())
            .unwrap_or(0)
    }

    /// Fingerprint `path` on a worker. The handler runs on this thread during
    /// [`ImageHasher::dispatch_pending`] or [`ImageHasher::wait_all`].
    pub fn image_hash<P, H>(&mut self, path: P, handler: Option<H>) -> Result<JobId>
    where
        P: AsRef<Path>,
        H: FnOnce(Option<Error>, EncodedFingerprint) + 'static,
    {
        self.dispatcher.submit(path, handler)
    }

    /// Deliver results that are ready without blocking
    pub fn dispatch_pending(&mut self) -> usize {
        self.dispatcher.dispatch_pending()
    }

    /// Block until every submitted job has been delivered
    pub fn wait_all(&mut self) -> usize {
        self.dispatcher.wait_all()
    }

    /// Jobs still waiting for their handler to run
    pub fn pending(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Whether two encoded fingerprints are within the configured threshold
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        hamming_distance(a, b) <= self.config.similarity_threshold
    }

    /// Hash two files and return their distance.
    ///
    /// Unlike the encoded entry points, a failure on either side is an error.
    pub fn compare_files(&self, a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<u32> {
        let fa = self.fingerprint(a)?;
        let fb = self.fingerprint(b)?;
        Ok(fa.distance(&fb))
    }
}

#[cfg(test)]
pub mod test_utils;
