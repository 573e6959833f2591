//! Event Logger: one append-only record per UNOCCUPIED → OCCUPIED entry.
//!
//! Independent of the upload cadence. Delivery is attempted once, right
//! away; a failure is surfaced to the caller and the event is dropped.

use log::{error, info};

use super::ports::{Ack, StorePort};
use super::records::{self, EventRecord};
use crate::config::DeviceId;
use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEventKind {
    MotionDetected,
}

impl SecurityEventKind {
    /// Value of the record's `type` field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MotionDetected => "motion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEvent {
    pub timestamp_ms: u64,
    pub device_id: DeviceId,
    pub kind: SecurityEventKind,
}

impl SecurityEvent {
    pub fn motion(timestamp_ms: u64, device_id: DeviceId) -> Self {
        Self {
            timestamp_ms,
            device_id,
            kind: SecurityEventKind::MotionDetected,
        }
    }

    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp_ms / 1_000
    }
}

#[derive(Debug, Default)]
pub struct EventLogger {
    delivered: u32,
    dropped: u32,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_event(
        &mut self,
        event: &SecurityEvent,
        store: &mut impl StorePort,
    ) -> Result<Ack, SyncError> {
        let id = event.device_id.as_str();
        let record = EventRecord {
            timestamp: event.timestamp_secs(),
            device_id: id,
            kind: event.kind.as_str(),
        };
        let result = records::to_body(&record)
            .and_then(|body| store.put(&records::event_path(id, record.timestamp), &body));

        match result {
            Ok(_) => {
                self.delivered = self.delivered.wrapping_add(1);
                info!("Security event logged at {} s", record.timestamp);
            }
            Err(e) => {
                self.dropped = self.dropped.wrapping_add(1);
                error!("Security event at {} s not delivered: {}", record.timestamp, e);
            }
        }
        result
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
