//! Durable destination for recorded check-ins.
//!
//! The core only appends. Implementations must tolerate concurrent calls and
//! are free to reorder records; any retry policy lives in the implementation.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::AttendanceRecord;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("attendance log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("attendance log unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceSink: Send + Sync {
    async fn append(&self, record: AttendanceRecord) -> Result<(), SinkError>;
}

/// Keeps records in process memory. Used when no log file is configured.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AttendanceRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttendanceSink for MemorySink {
    async fn append(&self, record: AttendanceRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionId;
    use chrono::Utc;

    fn record(student_id: &str) -> AttendanceRecord {
        AttendanceRecord::new(
            SessionId::new(),
            "0123456789abcdef",
            student_id,
            Default::default(),
            Utc::now(),
            &chrono_tz::UTC,
        )
    }

    #[tokio::test]
    async fn memory_sink_keeps_appended_records() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.append(record("a")).await.expect("append a");
        sink.append(record("b")).await.expect("append b");

        let students: Vec<_> = sink.records().into_iter().map(|r| r.student_id).collect();
        assert_eq!(students, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn memory_sink_accepts_concurrent_appends() {
        let sink = std::sync::Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.append(record(&format!("s-{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("append");
        }
        assert_eq!(sink.len(), 16);
    }
}
