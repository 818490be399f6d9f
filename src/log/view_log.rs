/// Session log of view operations
///
/// Each committed change to what the user sees is recorded with a
/// sequence number, a local timestamp, an operation name and a
/// description. The log exports as plain text or JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

const RULE_HEAVY: &str = "═══════════════════════════════════════════════════════════════\n";
const RULE_LIGHT: &str = "───────────────────────────────────────────────────────────────\n";

/// One recorded view operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the session
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub operation: String,
    pub description: String,
}

impl LogEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.description
        )
    }
}

/// Ordered record of everything a panel did to its views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub software_version: String,
    pub entries: Vec<LogEntry>,
}

impl ViewLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    /// Append an operation and echo it to the log facade
    pub fn add_entry(&mut self, operation: &str, description: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            operation: operation.to_string(),
            description: description.to_string(),
        });
        log::info!("[VIEW {:03}] {}: {}", seq, operation, description);
    }

    pub fn pop_entry(&mut self) -> Option<LogEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Operation names in order, mostly for tests and status lines
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.operation.as_str())
    }

    /// Human-readable export
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(RULE_HEAVY);
        out.push_str("  Spectrum View Session Log\n");
        out.push_str(RULE_HEAVY);
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Software:    spectra_view v{}\n", self.software_version));
        out.push_str(&format!("  Operations:  {}\n", self.entries.len()));
        out.push_str(RULE_LIGHT);
        out.push('\n');

        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }

        out.push('\n');
        out.push_str(RULE_HEAVY);
        out.push_str(&format!(
            "  Log exported: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(RULE_HEAVY);
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    pub fn save_text(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }

    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_json())
    }
}

impl Default for ViewLog {
    fn default() -> Self {
        Self::new()
    }
}
