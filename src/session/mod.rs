//! Review session: one cursor over a folder's media entries, a mark set and
//! a single-slot undo record.

use crate::models::{MediaEntry, RemovalManifest};
use crate::ops::error::{invalid_state, OpsResult};
use crate::ops::manifest::{manifest_timestamp, ManifestStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Empty,
    Reviewing,
    /// A full pass just completed; the UI asks whether to export.
    AwaitingExportDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastAction {
    Mark { path: String, newly_marked: bool },
    Keep,
}

/// Result of a mark/keep/advance step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub cursor: usize,
    pub wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undone {
    pub action: LastAction,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub manifest: RemovalManifest,
}

#[derive(Debug, Default)]
pub struct ReviewSession {
    folder: Option<PathBuf>,
    entries: Vec<MediaEntry>,
    cursor: usize,
    // marking order, no duplicates
    marked: Vec<String>,
    last_action: Option<LastAction>,
    awaiting_export: bool,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_entries(&mut self, folder: impl Into<PathBuf>, entries: Vec<MediaEntry>) {
        self.folder = Some(folder.into());
        self.entries = entries;
        self.cursor = 0;
        self.marked.clear();
        self.last_action = None;
        self.awaiting_export = false;
    }

    pub fn state(&self) -> SessionState {
        if self.entries.is_empty() {
            SessionState::Empty
        } else if self.awaiting_export {
            SessionState::AwaitingExportDecision
        } else {
            SessionState::Reviewing
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&MediaEntry> {
        self.entries.get(self.cursor)
    }

    /// 1-based position and total, for the `n / total` label.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.entries.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.entries.len()))
        }
    }

    pub fn marked(&self) -> &[String] {
        &self.marked
    }

    pub fn is_marked(&self, path: &str) -> bool {
        self.marked.iter().any(|p| p == path)
    }

    pub fn last_action(&self) -> Option<&LastAction> {
        self.last_action.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.state() != SessionState::Empty && self.last_action.is_some()
    }

    pub fn mark(&mut self) -> OpsResult<Step> {
        let path = self
            .current()
            .map(|entry| entry.path.clone())
            .ok_or_else(|| invalid_state("No media loaded"))?;

        let newly_marked = !self.is_marked(&path);
        if newly_marked {
            self.marked.push(path.clone());
        }
        self.last_action = Some(LastAction::Mark { path, newly_marked });
        self.advance()
    }

    pub fn keep(&mut self) -> OpsResult<Step> {
        if self.entries.is_empty() {
            return Err(invalid_state("No media loaded"));
        }
        self.last_action = Some(LastAction::Keep);
        self.advance()
    }

    /// Moves forward one entry. Every wrap back to the first entry raises
    /// the export gate again.
    pub fn advance(&mut self) -> OpsResult<Step> {
        if self.entries.is_empty() {
            return Err(invalid_state("No media loaded"));
        }
        self.cursor = (self.cursor + 1) % self.entries.len();
        let wrapped = self.cursor == 0;
        if wrapped {
            self.awaiting_export = true;
            tracing::info!(total = self.entries.len(), marked = self.marked.len(), "review cycle complete");
        } else {
            self.awaiting_export = false;
        }
        Ok(Step {
            cursor: self.cursor,
            wrapped,
        })
    }

    /// Reverts the last mark/keep. Only one step is ever remembered.
    /// Undoing the decision that completed a pass lowers the export gate.
    pub fn undo(&mut self) -> Option<Undone> {
        if self.entries.is_empty() {
            tracing::info!("undo ignored, no media loaded");
            return None;
        }
        let Some(action) = self.last_action.take() else {
            tracing::info!("nothing to undo");
            return None;
        };

        let len = self.entries.len();
        self.cursor = (self.cursor + len - 1) % len;
        if let LastAction::Mark {
            path,
            newly_marked: true,
        } = &action
        {
            self.marked.retain(|p| p != path);
        }
        self.awaiting_export = false;

        Some(Undone {
            action,
            cursor: self.cursor,
        })
    }

    /// Dismisses the export gate and keeps reviewing.
    pub fn resume(&mut self) -> OpsResult<()> {
        match self.state() {
            SessionState::AwaitingExportDecision => {
                self.awaiting_export = false;
                Ok(())
            }
            SessionState::Reviewing => Ok(()),
            SessionState::Empty => Err(invalid_state("No media loaded")),
        }
    }

    pub fn build_manifest(&self, now: DateTime<Utc>) -> RemovalManifest {
        let folder = self
            .folder
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        RemovalManifest {
            folder,
            timestamp: manifest_timestamp(now),
            removed_files: self.marked.clone(),
            total_files: self.entries.len(),
            removed_count: self.marked.len(),
        }
    }

    /// Persists the manifest and resets the session. The session is left
    /// untouched if the store fails.
    pub fn export_manifest<S: ManifestStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> OpsResult<ExportReceipt> {
        if self.folder.is_none() {
            return Err(invalid_state("No folder open"));
        }
        let manifest = self.build_manifest(Utc::now());
        let path = store.persist(&manifest)?;
        tracing::info!(path = %path.display(), removed = manifest.removed_count, "manifest exported");
        self.discard();
        Ok(ExportReceipt { path, manifest })
    }

    pub fn discard(&mut self) {
        self.folder = None;
        self.entries.clear();
        self.marked.clear();
        self.cursor = 0;
        self.last_action = None;
        self.awaiting_export = false;
    }
}
