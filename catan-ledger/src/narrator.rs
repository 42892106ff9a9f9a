//! Bounded audit trail of what the tracker did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::DEFAULT_AUDIT_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Internal bookkeeping, shown only with the debug display on.
    Debug,
    Info,
    Warning,
    /// The ledger or hypothesis set reached a state an earlier misread explains.
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    const fn log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Critical => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
}

/// Append-only ring buffer; the oldest entry goes once capacity is reached.
/// Every entry is also forwarded to the `log` facade.
#[derive(Debug, Clone)]
pub struct EventNarrator {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
}

impl Default for EventNarrator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

impl EventNarrator {
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: "catan_ledger::audit", severity.log_level(), "{message}");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(AuditEntry {
            message,
            timestamp: Utc::now(),
            severity,
        });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(Severity::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.record(Severity::Critical, message);
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// Entries oldest first, debug notes dropped unless `include_debug`.
    #[must_use]
    pub fn visible(&self, include_debug: bool) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .filter(|entry| include_debug || entry.severity != Severity::Debug)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
