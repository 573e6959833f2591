//! Application service: the hexagonal core.
//!
//! Two layers:
//!
//! - [`AutomationCore`] is pure: `tick(now, raw)` runs Sensor Reader →
//!   Occupancy FSM → Automation Controller and returns what should happen.
//!   No I/O, no clock, no network.
//! - [`NodeService`] is the I/O shell around it. Per tick it reads the
//!   sensors, runs the core, drives the relay, and only then talks to the
//!   store (event log first, then the upload if due).
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ ActuatorPort
//!      Clock  ──▶ │ NodeService                  │ ──▶ StorePort
//!                 │   AutomationCore (pure)      │ ──▶ EventSink
//!                 │   SyncUploader · EventLogger │
//!                 └──────────────────────────────┘
//! ```
//!
//! The relay write always completes before the first store call, so cooling
//! never waits on the network.

use log::info;

use crate::config::{DeviceId, SystemConfig};
use crate::error::{ActuatorError, SyncError};
use crate::fsm::context::{FsmContext, OccupancyState};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId, Transition};

use super::automation::{ActuatorCommand, ActuatorState, AutomationController};
use super::event_log::{EventLogger, SecurityEvent};
use super::events::AppEvent;
use super::ports::{Ack, ActuatorPort, Clock, EventSink, SensorPort, StorePort};
use super::reading::{RawSample, Reading, SensorReader};
use super::sync::SyncUploader;

// ───────────────────────────────────────────────────────────────
// AutomationCore (pure)
// ───────────────────────────────────────────────────────────────

/// Result of one pure tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub reading: Reading,
    pub command: ActuatorCommand,
    pub transition: Option<Transition>,
    pub event: Option<SecurityEvent>,
}

/// All automation state for one node. Owns the occupancy FSM and the
/// actuator decision; never performs I/O.
pub struct AutomationCore {
    device_id: DeviceId,
    reader: SensorReader,
    fsm: Fsm,
    ctx: FsmContext,
    controller: AutomationController,
}

impl AutomationCore {
    pub fn new(device_id: DeviceId, occupancy_window_ms: u64) -> Self {
        let mut ctx = FsmContext::new(occupancy_window_ms);
        let mut fsm = Fsm::new(build_state_table(), StateId::Unoccupied);
        fsm.start(&mut ctx);
        Self {
            device_id,
            reader: SensorReader::new(),
            fsm,
            ctx,
            controller: AutomationController::new(),
        }
    }

    /// Advance the core to `now_ms` with this tick's raw inputs.
    pub fn tick(&mut self, now_ms: u64, raw: RawSample) -> TickOutput {
        let reading = self.reader.read(now_ms, raw);

        self.ctx.now_ms = now_ms;
        self.ctx.motion = reading.motion;
        let transition = self.fsm.tick(&mut self.ctx);

        let event = match transition {
            Some(Transition {
                to: StateId::Occupied,
                ..
            }) => Some(SecurityEvent::motion(now_ms, self.device_id.clone())),
            _ => None,
        };

        let command = self.controller.update(&self.ctx.occupancy, now_ms);

        TickOutput {
            reading,
            command,
            transition,
            event,
        }
    }

    /// Record that the relay accepted `on`.
    pub fn actuator_applied(&mut self, on: bool) {
        self.controller.confirm(on);
    }

    pub fn occupancy(&self) -> OccupancyState {
        self.ctx.occupancy
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.controller.state()
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn degraded_reads(&self) -> u32 {
        self.reader.degraded_reads()
    }
}

// ───────────────────────────────────────────────────────────────
// NodeService (I/O shell)
// ───────────────────────────────────────────────────────────────

/// What one shell tick did, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub reading: Reading,
    pub actuator: ActuatorState,
    /// Relay write outcome, if a write was needed.
    pub actuator_write: Option<Result<(), ActuatorError>>,
    /// Security event and its delivery outcome, if one was raised.
    pub event: Option<(SecurityEvent, Result<Ack, SyncError>)>,
    /// Upload outcome, if the upload cadence fired.
    pub upload: Option<Result<Ack, SyncError>>,
}

pub struct NodeService {
    core: AutomationCore,
    uploader: SyncUploader,
    events: EventLogger,
    tick_count: u64,
}

impl NodeService {
    /// Build the service for a resolved device id.
    pub fn new(config: &SystemConfig, device_id: DeviceId) -> Self {
        Self {
            core: AutomationCore::new(device_id.clone(), u64::from(config.occupancy_window_ms)),
            uploader: SyncUploader::new(device_id, u64::from(config.upload_interval_ms)),
            events: EventLogger::new(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            device_id: self.core.device_id().clone(),
        });
        info!("NodeService started as '{}'", self.core.device_id());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One full cycle: sense → decide → actuate → (event log) → (upload).
    pub fn run_tick(
        &mut self,
        clock: &impl Clock,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl StorePort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;
        let now_ms = clock.now_ms();

        // 1. Sense + decide (pure)
        let raw = hw.read_raw();
        let out = self.core.tick(now_ms, raw);
        sink.emit(&AppEvent::Sampled(out.reading));
        if out.reading.is_degraded() {
            sink.emit(&AppEvent::ReadingDegraded {
                faults: out.reading.faults,
            });
        }
        if let Some(t) = out.transition {
            sink.emit(&AppEvent::OccupancyChanged {
                occupied: t.to == StateId::Occupied,
                at_ms: t.at_ms,
            });
        }

        // 2. Actuate, before any network call
        let actuator_write = match out.command {
            ActuatorCommand::Hold => None,
            ActuatorCommand::SetCooling(on) => {
                let result = hw.set_cooling(on);
                match result {
                    Ok(()) => {
                        self.core.actuator_applied(on);
                        sink.emit(&AppEvent::CoolingSwitched { on });
                    }
                    Err(error) => {
                        sink.emit(&AppEvent::CoolingWriteFailed { wanted: on, error });
                    }
                }
                Some(result)
            }
        };

        // 3. Security event, immediately and once
        let event = out.event.map(|ev| {
            let result = self.events.log_event(&ev, store);
            let timestamp_secs = ev.timestamp_secs();
            sink.emit(&match result {
                Ok(_) => AppEvent::SecurityEventLogged { timestamp_secs },
                Err(error) => AppEvent::SecurityEventUndelivered {
                    timestamp_secs,
                    error,
                },
            });
            (ev, result)
        });

        // 4. Periodic upload
        let upload = self.uploader.maybe_upload(now_ms, &out.reading, store);
        if let Some(result) = upload {
            let timestamp_secs = out.reading.timestamp_secs();
            sink.emit(&match result {
                Ok(_) => AppEvent::Uploaded { timestamp_secs },
                Err(error) => AppEvent::UploadFailed {
                    timestamp_secs,
                    error,
                },
            });
        }

        TickReport {
            reading: out.reading,
            actuator: self.core.actuator_state(),
            actuator_write,
            event,
            upload,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn core(&self) -> &AutomationCore {
        &self.core
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn failed_uploads(&self) -> u32 {
        self.uploader.failed_cycles()
    }

    pub fn dropped_events(&self) -> u32 {
        self.events.dropped()
    }
}
