//! Run-scoped diagnostics: error records and the shared collector

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            file: None,
        }
    }

    pub fn critical(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Critical, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "[{}] {} ({}): {}", self.severity, self.code, file, self.message),
            None => write!(f, "[{}] {}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Append-only record sink shared by every stage and batch worker of a run.
///
/// Cloning yields another handle to the same records. Each append takes the
/// lock once, so concurrent appends never interleave or get lost.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    records: Arc<Mutex<Vec<ErrorRecord>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&self, record: ErrorRecord) {
        self.records.lock().push(record);
    }

    pub fn all_errors(&self) -> Vec<ErrorRecord> {
        self.records.lock().clone()
    }

    pub fn critical(&self) -> Vec<ErrorRecord> {
        self.with_severity(Severity::Critical)
    }

    pub fn warnings(&self) -> Vec<ErrorRecord> {
        self.with_severity(Severity::Warning)
    }

    pub fn info(&self) -> Vec<ErrorRecord> {
        self.with_severity(Severity::Info)
    }

    pub fn critical_count(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn with_severity(&self, severity: Severity) -> Vec<ErrorRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == severity)
            .cloned()
            .collect()
    }
}

/// The parser collaborator rejected its input
#[derive(Debug, Error)]
#[error("Failed to parse {file}: {reason}")]
pub struct ParseError {
    pub file: String,
    pub reason: String,
}

/// A pipeline stage failed; the run continues without its output
#[derive(Debug, Error)]
#[error("Stage '{stage}' failed: {source}")]
pub struct StageError {
    pub stage: &'static str,
    #[source]
    pub source: anyhow::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_partitions_by_severity() {
        let collector = ErrorCollector::new();
        collector.add_error(ErrorRecord::critical("A", "broken"));
        collector.add_error(ErrorRecord::warning("B", "careful").in_file("pages/a.tsx"));
        collector.add_error(ErrorRecord::info("C", "fyi"));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.critical_count(), 1);
        assert_eq!(collector.warnings()[0].file.as_deref(), Some("pages/a.tsx"));
        assert_eq!(collector.info()[0].code, "C");
    }

    #[test]
    fn test_clones_share_records() {
        let collector = ErrorCollector::new();
        let handle = collector.clone();
        handle.add_error(ErrorRecord::warning("W", "from a worker"));
        assert_eq!(collector.warnings().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let collector = ErrorCollector::new();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let collector = collector.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        collector.add_error(ErrorRecord::info("N", format!("{worker}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(collector.len(), 800);
    }
}
