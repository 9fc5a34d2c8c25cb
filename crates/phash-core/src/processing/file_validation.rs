use crate::error::{Error, Result};
use crate::logging::log_file_error;
use log::debug;
use std::fs::File;
use std::path::Path;

/// Check that `path` names a regular file that can be opened for reading.
///
/// The transform is only ever handed paths that pass this check.
pub fn validate_readable(path: &Path) -> Result<std::fs::Metadata> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log_file_error(path, "metadata", &e);
            return Err(Error::FileUnavailable(path.to_path_buf()));
        }
    };

    if !metadata.is_file() {
        log_file_error(
            path,
            "check_is_file",
            &std::io::Error::new(std::io::ErrorKind::InvalidInput, "Not a regular file"),
        );
        return Err(Error::FileUnavailable(path.to_path_buf()));
    }

    if let Err(e) = File::open(path) {
        log_file_error(path, "open", &e);
        return Err(Error::FileUnavailable(path.to_path_buf()));
    }

    if metadata.len() == 0 {
        debug!("Zero-sized file passed validation: {}", path.display());
    }

    Ok(metadata)
}

/// Get file extension as lowercase string
pub fn get_file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
