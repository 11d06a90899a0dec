//! The single owner of review state. UI adapters call into this and
//! nothing else.

use crate::audit::DebugLog;
use crate::config::{AppConfig, PartialAppConfig};
use crate::keys::ReviewKey;
use crate::models::{AboutInfo, JobReport, MediaEntry, MediaKind};
use crate::ops::error::{OpsError, OpsResult};
use crate::ops::export::ExportDir;
use crate::ops::job::{JobConfig, JobRunner};
use crate::ops::paths::simplified;
use crate::ops::trash::default_strategies;
use crate::scanner::MediaScanner;
use crate::session::{ReviewSession, SessionState};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub folder_path: Option<String>,
    pub folder_name: Option<String>,
    pub current: Option<MediaEntry>,
    pub kind: Option<MediaKind>,
    /// 1-based.
    pub position: Option<usize>,
    pub total: usize,
    pub label: Option<String>,
    pub marked_count: usize,
    pub current_marked: bool,
    pub can_undo: bool,
    pub export_pending: bool,
    pub debug_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub manifest_path: String,
    pub removed_count: usize,
    pub total_files: usize,
    pub log_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub report: JobReport,
    pub message: String,
    pub log_path: Option<String>,
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

pub struct ReviewController {
    config: AppConfig,
    session: ReviewSession,
    debug_log: DebugLog,
    export_dir: ExportDir,
    runner: JobRunner,
    scanner: MediaScanner,
    default_runner: bool,
}

impl ReviewController {
    pub fn new(config: AppConfig, export_dir: ExportDir, runner: JobRunner) -> Self {
        let mut debug_log = DebugLog::new(config.debug_log_capacity);
        debug_log.set_enabled(config.debug_enabled);
        Self {
            config,
            session: ReviewSession::new(),
            debug_log,
            export_dir,
            runner,
            scanner: MediaScanner::new(),
            default_runner: false,
        }
    }

    /// Controller with the platform trash strategies and the configured
    /// export folder.
    pub fn from_config(config: AppConfig) -> OpsResult<Self> {
        config.validate()?;
        let runner = Self::default_runner_for(&config)?;
        let export_dir = ExportDir::from_config(&config);
        let mut controller = Self::new(config, export_dir, runner);
        controller.default_runner = true;
        Ok(controller)
    }

    fn default_runner_for(config: &AppConfig) -> OpsResult<JobRunner> {
        JobRunner::new(
            default_strategies(config.shell_fallbacks),
            JobConfig {
                missing_sample_size: config.missing_sample_size,
            },
        )
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    pub fn settings(&self) -> &AppConfig {
        &self.config
    }

    pub fn export_dir(&self) -> &ExportDir {
        &self.export_dir
    }

    fn record(&mut self, action: &str, details: Value) {
        self.debug_log.record(action, details);
    }

    fn flush_log(&mut self, action: &str) -> Option<String> {
        match self
            .debug_log
            .flush(&self.export_dir, &self.config.app_name, action)
        {
            Ok(path) => path.map(|p| p.to_string_lossy().to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to write debug log");
                None
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let session = &self.session;
        let current = session.current().cloned();
        let position = session.position();
        let label = match (&current, position) {
            (Some(entry), Some((n, total))) => Some(format!("{} / {} - {}", n, total, entry.name)),
            _ => None,
        };

        SessionView {
            state: session.state(),
            folder_path: session.folder().map(|p| p.to_string_lossy().to_string()),
            folder_name: session.folder().map(folder_name),
            kind: current.as_ref().map(|e| e.kind()),
            current_marked: current
                .as_ref()
                .map(|e| session.is_marked(&e.path))
                .unwrap_or(false),
            current,
            position: position.map(|(n, _)| n),
            total: session.entries().len(),
            label,
            marked_count: session.marked().len(),
            can_undo: session.can_undo(),
            export_pending: session.state() == SessionState::AwaitingExportDecision,
            debug_enabled: self.debug_log.is_enabled(),
        }
    }

    pub fn open_folder(&mut self, path: &Path) -> OpsResult<SessionView> {
        let folder = simplified(&path.canonicalize()?);
        let entries = self.scanner.list(&folder)?;
        tracing::info!(folder = %folder.display(), count = entries.len(), "folder opened");

        if !self.session.marked().is_empty() {
            tracing::warn!(
                marked = self.session.marked().len(),
                "previous session replaced without export"
            );
        }
        self.record(
            "open_folder",
            json!({ "folder": folder.to_string_lossy(), "count": entries.len() }),
        );
        self.session.load_entries(folder, entries);
        Ok(self.view())
    }

    fn ensure_not_gated(&self) -> OpsResult<()> {
        if self.session.state() == SessionState::AwaitingExportDecision {
            return Err(OpsError::ExportPending);
        }
        Ok(())
    }

    pub fn mark(&mut self) -> OpsResult<SessionView> {
        self.ensure_not_gated()?;
        let path = self.session.current().map(|e| e.path.clone());
        let step = self.session.mark()?;
        self.record(
            "mark",
            json!({ "path": path, "cursor": step.cursor, "wrapped": step.wrapped }),
        );
        Ok(self.view())
    }

    pub fn keep(&mut self) -> OpsResult<SessionView> {
        self.ensure_not_gated()?;
        let path = self.session.current().map(|e| e.path.clone());
        let step = self.session.keep()?;
        self.record(
            "keep",
            json!({ "path": path, "cursor": step.cursor, "wrapped": step.wrapped }),
        );
        Ok(self.view())
    }

    /// Undo of the last decision. Allowed while the export gate is up, since
    /// it retracts the decision that raised it.
    pub fn back(&mut self) -> OpsResult<SessionView> {
        match self.session.undo() {
            Some(undone) => {
                let details = match &undone.action {
                    crate::session::LastAction::Mark { path, newly_marked } => {
                        json!({ "undid": "mark", "path": path, "unmarked": newly_marked, "cursor": undone.cursor })
                    }
                    crate::session::LastAction::Keep => {
                        json!({ "undid": "keep", "cursor": undone.cursor })
                    }
                };
                self.record("undo", details);
            }
            None => self.record("undo_ignored", json!({ "state": self.session.state() })),
        }
        Ok(self.view())
    }

    /// Returns `None` for keys that are not review shortcuts.
    pub fn handle_key(&mut self, key: &str, repeat: bool) -> OpsResult<Option<SessionView>> {
        let view = match ReviewKey::from_key(key, repeat) {
            Some(ReviewKey::Remove) => self.mark()?,
            Some(ReviewKey::Back) => self.back()?,
            Some(ReviewKey::Keep) => self.keep()?,
            None => return Ok(None),
        };
        Ok(Some(view))
    }

    pub fn resume(&mut self) -> OpsResult<SessionView> {
        self.session.resume()?;
        self.record("resume", json!({}));
        Ok(self.view())
    }

    pub fn export(&mut self) -> OpsResult<ExportOutcome> {
        let receipt = self.session.export_manifest(&self.export_dir)?;
        self.record(
            "export",
            json!({
                "manifest": receipt.path.to_string_lossy(),
                "removedCount": receipt.manifest.removed_count,
                "totalFiles": receipt.manifest.total_files,
            }),
        );
        let log_path = self.flush_log("export");

        Ok(ExportOutcome {
            manifest_path: receipt.path.to_string_lossy().to_string(),
            removed_count: receipt.manifest.removed_count,
            total_files: receipt.manifest.total_files,
            log_path,
        })
    }

    pub fn discard(&mut self) -> SessionView {
        self.record(
            "discard",
            json!({ "marked": self.session.marked().len(), "total": self.session.entries().len() }),
        );
        self.session.discard();
        self.flush_log("discard");
        self.view()
    }

    pub fn run_job_from_manifest(&mut self, path: &Path) -> OpsResult<JobOutcome> {
        let text = fs::read_to_string(path)?;
        self.record("job_manifest", json!({ "manifest": path.to_string_lossy() }));
        self.run_job_from_text(&text)
    }

    pub fn run_job_from_text(&mut self, text: &str) -> OpsResult<JobOutcome> {
        let result = self.runner.run_manifest_text(text);
        self.finish_job(result)
    }

    /// Runs the current marks through the job runner right away, then
    /// closes the session.
    pub fn run_job_for_marked(&mut self) -> OpsResult<JobOutcome> {
        let paths = self.session.marked().to_vec();
        let result = self.runner.run_paths(&paths);
        let succeeded = result.is_ok();
        let outcome = self.finish_job(result)?;
        if succeeded {
            self.session.discard();
        }
        Ok(outcome)
    }

    fn finish_job(&mut self, result: OpsResult<JobReport>) -> OpsResult<JobOutcome> {
        match result {
            Ok(report) => {
                let failures: Vec<Value> = report
                    .failures()
                    .map(|r| json!({ "path": r.path, "error": r.error }))
                    .collect();
                self.record(
                    "job",
                    json!({
                        "succeeded": report.summary.succeeded,
                        "failed": report.summary.failed,
                        "failures": failures,
                    }),
                );
                let log_path = self.flush_log("job");
                Ok(JobOutcome {
                    message: report.summary.to_string(),
                    report,
                    log_path,
                })
            }
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "job refused");
                let details = match &err {
                    OpsError::MissingFiles { count, sample } => {
                        json!({ "error": err.code(), "missing": count, "sample": sample })
                    }
                    _ => json!({ "error": err.code(), "message": err.to_string() }),
                };
                self.record("job_failed", details);
                self.flush_log("job");
                Err(err)
            }
        }
    }

    /// Flips debug logging. Turning it off writes out what was recorded.
    pub fn toggle_debug(&mut self) -> bool {
        if self.debug_log.is_enabled() {
            self.record("debug_off", json!({}));
            self.flush_log("session");
            self.debug_log.set_enabled(false);
        } else {
            self.debug_log.set_enabled(true);
            self.record("debug_on", json!({}));
        }
        self.config.debug_enabled = self.debug_log.is_enabled();
        self.config.debug_enabled
    }

    pub fn update_settings(&mut self, update: PartialAppConfig) -> OpsResult<AppConfig> {
        let mut next = self.config.clone();
        next.apply(update)?;

        if self.default_runner && next.shell_fallbacks != self.config.shell_fallbacks {
            self.runner = Self::default_runner_for(&next)?;
        } else {
            self.runner.set_config(JobConfig {
                missing_sample_size: next.missing_sample_size,
            });
        }
        if next.export_root != self.config.export_root
            || next.export_subfolder != self.config.export_subfolder
        {
            self.export_dir = ExportDir::from_config(&next);
        }
        self.debug_log.set_capacity(next.debug_log_capacity);
        self.debug_log.set_enabled(next.debug_enabled);

        self.config = next;
        self.record("settings", json!({ "settings": self.config }));
        Ok(self.config.clone())
    }

    pub fn about(&self) -> AboutInfo {
        AboutInfo::default()
    }

    /// App is closing: write out whatever the debug log holds.
    pub fn shutdown(&mut self) -> Option<String> {
        self.record("quit", json!({}));
        self.flush_log("session")
    }
}
