use std::sync::Arc;

use crate::{
    clock::Clock,
    config::Config,
    services::{AttendanceSink, CheckInService, CheckInSettings, CsvFileSink, MemorySink},
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CheckInService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<CheckInService>, config: Config) -> Self {
        Self { service, config }
    }

    /// Wires the check-in core from configuration.
    pub fn from_config(
        config: Config,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn AttendanceSink>,
    ) -> Self {
        let settings = CheckInSettings {
            ttl: config.token_ttl,
            token_bytes: config.token_bytes,
            time_zone: config.time_zone,
            check_in_base_url: config.public_base_url.clone(),
        };
        let service = Arc::new(CheckInService::new(clock, sink, settings));
        Self::new(service, config)
    }
}

/// CSV file when `ATTENDANCE_LOG_PATH` is set, otherwise process memory.
pub fn sink_from_config(config: &Config) -> Arc<dyn AttendanceSink> {
    match &config.attendance_log_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Recording attendance to CSV file");
            Arc::new(CsvFileSink::new(path.clone()))
        }
        None => {
            tracing::warn!("ATTENDANCE_LOG_PATH not set; attendance is kept in memory only");
            Arc::new(MemorySink::new())
        }
    }
}
