use crate::models::{DeletionResult, JobReport};
use crate::ops::error::{OpsError, OpsResult};
use crate::ops::manifest::parse_removed_files;
use crate::ops::paths::{normalize_path, verify_paths};
use crate::ops::trash::{TrashOutcome, TrashStrategy};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct JobConfig {
    /// How many missing paths to show when a job is refused.
    pub missing_sample_size: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            missing_sample_size: 5,
        }
    }
}

/// Verifies and deletes the files a manifest names.
///
/// Verification is all-or-nothing: one missing file stops the whole job
/// before anything is touched. Deletion is per file: a failure is recorded
/// in that file's result and the rest of the batch still runs.
pub struct JobRunner {
    strategies: Vec<Box<dyn TrashStrategy>>,
    config: JobConfig,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("JobRunner")
            .field("strategies", &names)
            .field("config", &self.config)
            .finish()
    }
}

impl JobRunner {
    pub fn new(strategies: Vec<Box<dyn TrashStrategy>>, config: JobConfig) -> OpsResult<Self> {
        if strategies.is_empty() {
            return Err(OpsError::NoStrategies);
        }
        Ok(Self { strategies, config })
    }

    pub fn set_config(&mut self, config: JobConfig) {
        self.config = config;
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn run_manifest_text(&self, text: &str) -> OpsResult<JobReport> {
        let paths = parse_removed_files(text)?;
        self.run_paths(&paths)
    }

    pub fn run_paths(&self, raw_paths: &[String]) -> OpsResult<JobReport> {
        if raw_paths.is_empty() {
            return Err(OpsError::EmptyJob);
        }
        let start = Instant::now();

        let paths: Vec<String> = raw_paths.iter().map(|p| normalize_path(p)).collect();
        let verification = verify_paths(&paths);
        if let Err(err) = verification.ensure_all_present(self.config.missing_sample_size) {
            tracing::warn!(
                missing = verification.missing.len(),
                total = paths.len(),
                "job aborted before deleting anything"
            );
            return Err(err);
        }

        let results: Vec<DeletionResult> = paths.iter().map(|p| self.delete_one(p)).collect();
        let report = JobReport::new(results);

        tracing::info!(
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "job finished"
        );
        Ok(report)
    }

    fn delete_one(&self, path: &str) -> DeletionResult {
        let mut last_error = String::from("no strategy attempted");
        for strategy in &self.strategies {
            match strategy.attempt_trash(Path::new(path)) {
                TrashOutcome::Success => {
                    tracing::debug!(path, strategy = strategy.name(), "file removed");
                    return DeletionResult::succeeded(path, strategy.name());
                }
                TrashOutcome::StrategyFailed(reason) => {
                    tracing::debug!(path, strategy = strategy.name(), %reason, "strategy failed");
                    last_error = reason;
                }
            }
        }
        tracing::warn!(path, error = %last_error, "every strategy failed");
        DeletionResult::failed(path, last_error)
    }
}
