//! Mock adapters for integration tests.
//!
//! Every port is backed by plain data so tests can script inputs and
//! assert on the full call history without touching GPIO or the network.

use std::cell::Cell;
use std::collections::VecDeque;

use safelabs::app::events::AppEvent;
use safelabs::app::ports::{Ack, ActuatorPort, Clock, EventSink, SensorPort, StorePort};
use safelabs::app::reading::RawSample;
use safelabs::error::{ActuatorError, SyncError};

// ── Hardware ──────────────────────────────────────────────────

/// One externally observable call, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Read,
    SetCooling(bool),
}

pub struct MockHardware {
    samples: VecDeque<RawSample>,
    pub calls: Vec<HwCall>,
    /// Fail the next N relay writes.
    pub fail_writes: u32,
    relay_on: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            calls: Vec::new(),
            fail_writes: 0,
            relay_on: false,
        }
    }

    pub fn push(&mut self, sample: RawSample) {
        self.samples.push_back(sample);
    }

    pub fn push_motion(&mut self, motion: bool) {
        self.push(RawSample::ok(22.0, 45.0, 350.0, motion));
    }

    pub fn relay_on(&self) -> bool {
        self.relay_on
    }

    /// Relay writes that reached the hardware, in order.
    pub fn cooling_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::SetCooling(on) => Some(*on),
                HwCall::Read => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_raw(&mut self) -> RawSample {
        self.calls.push(HwCall::Read);
        self.samples
            .pop_front()
            .unwrap_or_else(|| RawSample::ok(22.0, 45.0, 350.0, false))
    }
}

impl ActuatorPort for MockHardware {
    fn set_cooling(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::SetCooling(on));
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.relay_on = on;
        Ok(())
    }
}

// ── Store ─────────────────────────────────────────────────────

pub struct MockStore {
    /// `(path, body)` in call order, failed calls included.
    pub puts: Vec<(String, String)>,
    pub fail_with: Option<SyncError>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            puts: Vec::new(),
            fail_with: None,
        }
    }

    pub fn failing(error: SyncError) -> Self {
        Self {
            puts: Vec::new(),
            fail_with: Some(error),
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.puts.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.puts.iter().filter(|(p, _)| p.starts_with(prefix)).count()
    }

    pub fn body_at(&self, path: &str) -> Option<&str> {
        self.puts
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.as_str())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorePort for MockStore {
    fn put(&mut self, path: &str, body: &str) -> Result<Ack, SyncError> {
        self.puts.push((path.to_string(), body.to_string()));
        match self.fail_with {
            Some(e) => Err(e),
            None => Ok(Ack { status: 200 }),
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct ManualClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
