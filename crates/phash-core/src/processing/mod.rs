// Core modules
mod file_validation;

pub mod dispatcher;
pub mod hash_computer;
pub mod transform;

// Reexport core functionality
pub use dispatcher::{CompletionHandler, JobDispatcher, JobId, JobState};
pub use file_validation::{get_file_extension, validate_readable};
pub use hash_computer::{extract_panic_info, HashComputer};
pub use transform::{dct_phash, DctTransform, PerceptualTransform};
