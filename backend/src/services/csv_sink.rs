use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::models::AttendanceRecord;
use crate::services::attendance_sink::{AttendanceSink, SinkError};
use crate::utils::csv::{append_csv_row, attendance_row, ATTENDANCE_HEADER};

/// Appends one CSV row per check-in to a file that spreadsheet tools can open.
///
/// Writes go through a single async lock so concurrent rows never interleave.
/// The header is written when the file is empty.
#[derive(Debug)]
pub struct CsvFileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AttendanceSink for CsvFileSink {
    async fn append(&self, record: AttendanceRecord) -> Result<(), SinkError> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut buffer = String::new();
        if file.metadata().await?.len() == 0 {
            append_csv_row(&mut buffer, &ATTENDANCE_HEADER);
        }
        append_csv_row(&mut buffer, &attendance_row(&record));

        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            record_id = %record.id,
            path = %self.path.display(),
            "Appended attendance row"
        );
        Ok(())
    }
}
