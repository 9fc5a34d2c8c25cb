use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fingerprint::{EncodedFingerprint, Fingerprint, SENTINEL};
use crate::logging::log_hash_error;

use super::file_validation::{get_file_extension, validate_readable};
use super::transform::{DctTransform, PerceptualTransform};

/// Extract panic info from panic value
pub fn extract_panic_info(panic_err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        format!("Panic with message: {}", s)
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        format!("Panic with message: {}", s)
    } else {
        "Unknown panic occurred".to_string()
    }
}

/// Runs a [`PerceptualTransform`] on files and contains every way it can fail.
///
/// Cloning is cheap; clones share the transform.
#[derive(Clone)]
pub struct HashComputer {
    transform: Arc<dyn PerceptualTransform>,
}

impl Default for HashComputer {
    fn default() -> Self {
        Self::new(Arc::new(DctTransform::new()))
    }
}

impl std::fmt::Debug for HashComputer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashComputer")
            .field("transform", &self.transform.name())
            .finish()
    }
}

impl HashComputer {
    pub fn new(transform: Arc<dyn PerceptualTransform>) -> Self {
        Self { transform }
    }

    /// Compute the fingerprint of `path`.
    ///
    /// Fails with [`Error::FileUnavailable`] before the transform runs when the
    /// file cannot be read, and with [`Error::TransformFault`] for anything the
    /// transform reports or any panic it raises.
    pub fn compute(&self, path: &Path) -> Result<Fingerprint> {
        validate_readable(path)?;

        debug!(
            "Hashing '{}' ({}) with {} transform",
            path.display(),
            get_file_extension(path),
            self.transform.name()
        );

        let transform = &self.transform;
        let result = panic::catch_unwind(AssertUnwindSafe(|| transform.hash_file(path)));

        match result {
            Ok(Ok(fingerprint)) => Ok(fingerprint),
            Ok(Err(e)) => {
                let err = match e {
                    Error::TransformFault { .. } | Error::FileUnavailable(_) => e,
                    other => Error::transform(path, other.to_string()),
                };
                log_hash_error(path, &err);
                Err(err)
            }
            Err(panic_err) => {
                let panic_msg = extract_panic_info(panic_err);
                warn!(
                    "PANIC during perceptual hash for '{}': {}",
                    path.display(),
                    panic_msg
                );

                let err = Error::transform(path, panic_msg);
                log_hash_error(path, &err);
                Err(err)
            }
        }
    }

    /// Compute and encode, collapsing every failure into the sentinel `"0"`
    pub fn compute_encoded(&self, path: &Path) -> EncodedFingerprint {
        match self.compute(path) {
            Ok(fingerprint) => fingerprint.encode(),
            Err(_) => SENTINEL.to_string(),
        }
    }
}
