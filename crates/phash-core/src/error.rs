use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the phash library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Target file is missing, not a regular file, or cannot be opened
    #[error("File unavailable: {}", .0.display())]
    FileUnavailable(PathBuf),

    /// The perceptual transform failed while decoding or processing the image
    #[error("Transform failed for {}: {reason}", path.display())]
    TransformFault { path: PathBuf, reason: String },

    /// A string could not be parsed as a 64-bit unsigned fingerprint
    #[error("Malformed fingerprint: {0:?}")]
    MalformedFingerprint(String),

    /// A required argument was missing or unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    /// Build a transform fault for `path`
    pub fn transform(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::TransformFault {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
