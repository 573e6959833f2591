//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters decide where they go;
//! on the device they become tagged serial log lines.

use crate::config::DeviceId;
use crate::error::{ActuatorError, SyncError};

use super::reading::Reading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started.
    Started { device_id: DeviceId },

    /// A reading was taken this tick.
    Sampled(Reading),

    /// One or more channels fell back to the sentinel (mask of `ChannelFault`).
    ReadingDegraded { faults: u8 },

    /// Occupancy flipped.
    OccupancyChanged { occupied: bool, at_ms: u64 },

    /// The relay accepted a new state.
    CoolingSwitched { on: bool },

    /// The relay rejected a write; it is re-applied next tick.
    CoolingWriteFailed { wanted: bool, error: ActuatorError },

    /// Latest and history records were both written.
    Uploaded { timestamp_secs: u64 },

    /// The upload cycle was skipped.
    UploadFailed { timestamp_secs: u64, error: SyncError },

    /// A security event reached the store.
    SecurityEventLogged { timestamp_secs: u64 },

    /// A security event could not be delivered and is dropped.
    SecurityEventUndelivered { timestamp_secs: u64, error: SyncError },
}
