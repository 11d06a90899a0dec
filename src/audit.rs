//! Debug/audit trail. Bounded ring of timestamped actions, flushed to a
//! plain text file in the export folder. Unrelated to undo.

use crate::ops::error::OpsResult;
use crate::ops::export::{log_file_name, ExportDir};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DebugLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: Value,
}

#[derive(Debug)]
pub struct DebugLog {
    enabled: bool,
    capacity: usize,
    entries: VecDeque<DebugLogEntry>,
    dropped: usize,
}

impl DebugLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            enabled: false,
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            dropped: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
    }

    pub fn record(&mut self, action: &str, details: Value) {
        if !self.enabled {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(DebugLogEntry {
            timestamp: Utc::now(),
            action: action.to_string(),
            details,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &DebugLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted by the cap since the last flush.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn render(&self, app_name: &str) -> String {
        let mut out = format!(
            "{} debug log: {} entries, {} dropped\n",
            app_name,
            self.entries.len(),
            self.dropped
        );
        for entry in &self.entries {
            out.push_str(&format!(
                "[{}] {} {}\n",
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                entry.action.to_uppercase(),
                entry.details
            ));
        }
        out
    }

    /// Writes the transcript and starts a fresh ring. Nothing is written
    /// when there is nothing recorded.
    pub fn flush(
        &mut self,
        dir: &ExportDir,
        app_name: &str,
        action: &str,
    ) -> OpsResult<Option<PathBuf>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let file_name = log_file_name(app_name, action, Local::now());
        let path = dir.write_text(&file_name, &self.render(app_name))?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "debug log written");
        self.entries.clear();
        self.dropped = 0;
        Ok(Some(path))
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
