use crate::correlator::Elapsed;
use chrono::{DateTime, Local};

/// One directory entry as reported by a [`crate::remote::RemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub modified_at: Option<DateTime<Local>>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub file_name: String,
    pub record_count: u64,
    pub size_bytes: u64,
    pub processing_time: Option<Elapsed>,
}

impl LogRecord {
    /// Processing time as written to the report; empty when the log had no origin file.
    #[must_use]
    pub fn processing_time_display(&self) -> String {
        self.processing_time
            .map(|e| e.to_string())
            .unwrap_or_default()
    }
}
