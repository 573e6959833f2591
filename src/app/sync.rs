//! Sync Uploader: periodic latest/history writes.
//!
//! One upload per cadence firing, best effort, at most once:
//!
//! 1. `devices/{id}/latest`: replaced with the newest reading.
//! 2. `devices/{id}/history/{secs}`: only after step 1 succeeded.
//!
//! `labs/{id}/ac` belongs to the dashboard and is never written here.
//! The first failing step ends the cycle. Nothing is queued for later; the
//! next cycle uploads whatever reading is current then.

use log::{debug, error, warn};

use super::ports::{Ack, StorePort};
use super::reading::Reading;
use super::records::{self, TelemetryRecord};
use crate::config::DeviceId;
use crate::error::SyncError;
use crate::scheduler::Cadence;

pub struct SyncUploader {
    device_id: DeviceId,
    cadence: Cadence,
    failed_cycles: u32,
}

impl SyncUploader {
    pub fn new(device_id: DeviceId, upload_interval_ms: u64) -> Self {
        Self {
            device_id,
            cadence: Cadence::new(upload_interval_ms),
            failed_cycles: 0,
        }
    }

    /// Run the upload if the cadence fired at `now_ms`.
    ///
    /// Returns `None` when no upload was due. The attempt is recorded
    /// whatever the outcome, so a failure is not retried within the cycle.
    pub fn maybe_upload(
        &mut self,
        now_ms: u64,
        reading: &Reading,
        store: &mut impl StorePort,
    ) -> Option<Result<Ack, SyncError>> {
        if !self.cadence.poll(now_ms) {
            return None;
        }
        let result = self.upload(reading, store);
        if let Err(e) = result {
            self.failed_cycles = self.failed_cycles.wrapping_add(1);
            if e.is_rejection() {
                error!("Upload rejected: {} (cycle skipped)", e);
            } else {
                warn!("Upload failed: {} (cycle skipped)", e);
            }
        }
        Some(result)
    }

    /// Write latest, then history.
    pub fn upload(&self, reading: &Reading, store: &mut impl StorePort) -> Result<Ack, SyncError> {
        let id = self.device_id.as_str();
        let body = records::to_body(&TelemetryRecord::from_reading(reading, id))?;

        store.put(&records::latest_path(id), &body)?;
        debug!("Latest record written");

        store.put(&records::history_path(id, reading.timestamp_secs()), &body)
    }

    /// Cycles that ended in an error since boot.
    pub fn failed_cycles(&self) -> u32 {
        self.failed_cycles
    }

    pub fn attempted_cycles(&self) -> u32 {
        self.cadence.fired_count()
    }
}
