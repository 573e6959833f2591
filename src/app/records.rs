//! Store record schemas and namespace paths.
//!
//! ```text
//!  devices/{id}/latest              telemetry, replaced every upload
//!  devices/{id}/history/{secs}      telemetry, one per upload
//!  events/{id}/{secs}               security events
//! ```
//!
//! Timestamps in records and keys are whole seconds since boot.

use serde::Serialize;

use super::reading::Reading;
use crate::error::SyncError;

/// Telemetry record written to `latest` and `history`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TelemetryRecord<'a> {
    pub timestamp: u64,
    pub temperature: f32,
    pub humidity: f32,
    pub gas_ppm: f32,
    pub motion_detected: bool,
    pub device_id: &'a str,
}

impl<'a> TelemetryRecord<'a> {
    pub fn from_reading(reading: &Reading, device_id: &'a str) -> Self {
        Self {
            timestamp: reading.timestamp_secs(),
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            gas_ppm: reading.gas_ppm,
            motion_detected: reading.motion,
            device_id,
        }
    }
}

/// Security event record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRecord<'a> {
    pub timestamp: u64,
    pub device_id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Serialise a record into the JSON body handed to the store.
pub fn to_body<T: Serialize>(record: &T) -> Result<String, SyncError> {
    serde_json::to_string(record).map_err(|_| SyncError::Encode)
}

// ───────────────────────────────────────────────────────────────
// Paths
// ───────────────────────────────────────────────────────────────

pub fn latest_path(device_id: &str) -> String {
    format!("devices/{device_id}/latest")
}

pub fn history_path(device_id: &str, timestamp_secs: u64) -> String {
    format!("devices/{device_id}/history/{timestamp_secs}")
}

pub fn event_path(device_id: &str, timestamp_secs: u64) -> String {
    format!("events/{device_id}/{timestamp_secs}")
}
