//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production). One tagged line per event;
//! delivery failures are logged at `error`/`warn` so they stand out on the
//! console.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::reading::ChannelFault;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { device_id } => {
                info!("START | device_id={}", device_id);
            }
            AppEvent::Sampled(r) => {
                info!(
                    "READ | t={}s | T={:.1}\u{00b0}C | RH={:.1}% | gas={:.0}ppm | motion={}",
                    r.timestamp_secs(),
                    r.temperature_c,
                    r.humidity_pct,
                    r.gas_ppm,
                    if r.motion { "YES" } else { "no" },
                );
            }
            AppEvent::ReadingDegraded { faults } => {
                warn!(
                    "READ | degraded: climate={} gas={} motion={} (mask=0b{:03b})",
                    faults & ChannelFault::Climate.mask() != 0,
                    faults & ChannelFault::Gas.mask() != 0,
                    faults & ChannelFault::Motion.mask() != 0,
                    faults,
                );
            }
            AppEvent::OccupancyChanged { occupied, at_ms } => {
                info!(
                    "OCCUPANCY | {} at {} ms",
                    if *occupied { "occupied" } else { "vacant" },
                    at_ms
                );
            }
            AppEvent::CoolingSwitched { on } => {
                info!("COOLING | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::CoolingWriteFailed { wanted, error: e } => {
                error!(
                    "COOLING | write {} failed: {} (retrying next tick)",
                    if *wanted { "ON" } else { "OFF" },
                    e
                );
            }
            AppEvent::Uploaded { timestamp_secs } => {
                info!("SYNC | uploaded t={}s", timestamp_secs);
            }
            AppEvent::UploadFailed {
                timestamp_secs,
                error: e,
            } => {
                warn!("SYNC | t={}s skipped: {}", timestamp_secs, e);
            }
            AppEvent::SecurityEventLogged { timestamp_secs } => {
                info!("EVENT | motion t={}s logged", timestamp_secs);
            }
            AppEvent::SecurityEventUndelivered {
                timestamp_secs,
                error: e,
            } => {
                error!("EVENT | motion t={}s UNDELIVERED: {}", timestamp_secs, e);
            }
        }
    }
}
