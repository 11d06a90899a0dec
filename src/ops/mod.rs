pub mod error;
pub mod export;
pub mod job;
pub mod manifest;
pub mod paths;
pub mod trash;

pub use error::{ErrorMessage, OpsError, OpsResult};
pub use export::{log_file_name, ExportDir};
pub use job::{JobConfig, JobRunner};
pub use manifest::{parse_removed_files, ManifestStore};
pub use paths::{normalize_path, verify_paths, Verification};
pub use trash::{default_strategies, HomeTrash, NativeTrash, ShellStrategy, TrashOutcome, TrashStrategy};

#[cfg(test)]
mod tests;
