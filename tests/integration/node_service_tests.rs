//! Integration tests for the NodeService → core → relay/store pipeline.
//!
//! Runs the service against the mock adapters with the default timing
//! (poll 2.5 s, upload 5 s, occupancy window 15 s).

use std::cell::RefCell;
use std::rc::Rc;

use safelabs::app::events::AppEvent;
use safelabs::app::ports::{Ack, ActuatorPort, SensorPort, StorePort};
use safelabs::app::reading::RawSample;
use safelabs::app::service::{NodeService, TickReport};
use safelabs::config::{DeviceId, SystemConfig};
use safelabs::error::{ActuatorError, SensorError, SyncError};

use crate::mock_hw::{ManualClock, MockHardware, MockStore, RecordingSink};

const POLL_MS: u64 = 2_500;

fn node_id() -> DeviceId {
    let mut id = DeviceId::new();
    id.push_str("sensor_node_01").unwrap();
    id
}

struct Bench {
    service: NodeService,
    clock: ManualClock,
    hw: MockHardware,
    store: MockStore,
    sink: RecordingSink,
}

impl Bench {
    fn new(store: MockStore) -> Self {
        let mut sink = RecordingSink::new();
        let mut service = NodeService::new(&SystemConfig::default(), node_id());
        service.start(&mut sink);
        Self {
            service,
            clock: ManualClock::new(),
            hw: MockHardware::new(),
            store,
            sink,
        }
    }

    /// One tick at `at_ms` with the given motion input.
    fn tick(&mut self, at_ms: u64, motion: bool) -> TickReport {
        self.clock.set(at_ms);
        self.hw.push_motion(motion);
        self.service
            .run_tick(&self.clock, &mut self.hw, &mut self.store, &mut self.sink)
    }

    fn tick_raw(&mut self, at_ms: u64, raw: RawSample) -> TickReport {
        self.clock.set(at_ms);
        self.hw.push(raw);
        self.service
            .run_tick(&self.clock, &mut self.hw, &mut self.store, &mut self.sink)
    }
}

fn events_logged(store: &MockStore) -> Vec<String> {
    store
        .paths()
        .into_iter()
        .filter(|p| p.starts_with("events/"))
        .map(str::to_string)
        .collect()
}

// ── End-to-end: one pulse, 15 s of cooling ───────────────────

#[test]
fn single_pulse_cools_for_one_window() {
    let mut b = Bench::new(MockStore::new());
    let mut trace = Vec::new();

    for n in 1..=8u64 {
        let at = n * POLL_MS;
        let r = b.tick(at, at == 2_500);
        trace.push((at, r.actuator.is_on));
    }

    assert_eq!(
        trace,
        vec![
            (2_500, true),
            (5_000, true),
            (7_500, true),
            (10_000, true),
            (12_500, true),
            (15_000, true),
            (17_500, false),
            (20_000, false),
        ]
    );
    assert_eq!(b.hw.cooling_writes(), vec![true, false]);
    assert_eq!(events_logged(&b.store), vec!["events/sensor_node_01/2".to_string()]);
    let body = b.store.body_at("events/sensor_node_01/2").unwrap();
    assert!(body.contains(r#""type":"motion""#), "body: {body}");
    assert!(body.contains(r#""device_id":"sensor_node_01""#), "body: {body}");
}

#[test]
fn uploads_follow_their_own_cadence() {
    let mut b = Bench::new(MockStore::new());
    for n in 1..=8u64 {
        b.tick(n * POLL_MS, n == 1);
    }

    // Upload cycles at 5, 10, 15, 20 s; two writes each.
    assert_eq!(b.store.count_prefix("devices/sensor_node_01/latest"), 4);
    assert_eq!(b.store.count_prefix("devices/sensor_node_01/history/"), 4);
    assert!(b.store.body_at("devices/sensor_node_01/history/5").is_some());
    assert!(b.store.body_at("devices/sensor_node_01/history/20").is_some());
    assert!(b.store.body_at("devices/sensor_node_01/history/2").is_none());

    // The dashboard's toggle path is left alone while cooling runs.
    assert_eq!(b.store.count_prefix("labs/"), 0);
    assert_eq!(b.store.puts.len(), 4 * 2 + 1);
}

#[test]
fn upload_writes_latest_then_history() {
    let mut b = Bench::new(MockStore::new());
    b.tick(2_500, false);
    b.tick(5_000, false);
    assert_eq!(
        b.store.paths(),
        vec![
            "devices/sensor_node_01/latest",
            "devices/sensor_node_01/history/5",
        ]
    );
    assert_eq!(
        b.store.body_at("devices/sensor_node_01/latest"),
        b.store.body_at("devices/sensor_node_01/history/5")
    );
}

// ── Extension vs. re-trigger ─────────────────────────────────

#[test]
fn second_pulse_extends_without_new_event() {
    let mut b = Bench::new(MockStore::new());
    let mut on = Vec::new();
    for n in 0..=12u64 {
        let at = n * POLL_MS;
        let r = b.tick(at, at == 0 || at == 10_000);
        on.push((at, r.actuator.is_on));
    }

    for &(at, is_on) in &on {
        assert_eq!(is_on, at < 25_000, "at {at} ms");
    }
    assert_eq!(events_logged(&b.store), vec!["events/sensor_node_01/0".to_string()]);
    assert_eq!(b.hw.cooling_writes(), vec![true, false]);
}

#[test]
fn lapsed_window_makes_next_pulse_a_new_event() {
    let mut b = Bench::new(MockStore::new());
    let mut on = Vec::new();
    for n in 0..=16u64 {
        let at = n * POLL_MS;
        let r = b.tick(at, at == 0 || at == 20_000);
        on.push((at, r.actuator.is_on));
    }

    for &(at, is_on) in &on {
        let expected = at < 15_000 || (20_000..35_000).contains(&at);
        assert_eq!(is_on, expected, "at {at} ms");
    }
    assert_eq!(
        events_logged(&b.store),
        vec![
            "events/sensor_node_01/0".to_string(),
            "events/sensor_node_01/20".to_string()
        ]
    );
    assert_eq!(b.hw.cooling_writes(), vec![true, false, true, false]);
    assert_eq!(
        b.sink.count(|e| matches!(e, AppEvent::OccupancyChanged { occupied: true, .. })),
        2
    );
}

// ── Network independence ─────────────────────────────────────

fn actuator_trace(store: MockStore) -> (Vec<bool>, Vec<bool>) {
    let mut b = Bench::new(store);
    let mut states = Vec::new();
    for n in 1..=10u64 {
        let motion = n == 1 || n == 9;
        states.push(b.tick(n * POLL_MS, motion).actuator.is_on);
    }
    (states, b.hw.cooling_writes())
}

#[test]
fn failing_store_never_changes_actuator_trace() {
    let healthy = actuator_trace(MockStore::new());
    for error in [
        SyncError::NotConnected,
        SyncError::Timeout,
        SyncError::Transport,
        SyncError::Rejected { status: 401 },
    ] {
        assert_eq!(actuator_trace(MockStore::failing(error)), healthy, "{error:?}");
    }
    assert_eq!(
        healthy.0,
        vec![true, true, true, true, true, true, false, false, true, true]
    );
}

#[test]
fn failed_upload_is_not_retried_and_next_cycle_is_fresh() {
    let mut b = Bench::new(MockStore::failing(SyncError::Timeout));
    b.tick(2_500, false);
    let r = b.tick(5_000, false);
    assert_eq!(r.upload, Some(Err(SyncError::Timeout)));
    // The cycle stopped at the first failed write.
    assert_eq!(b.store.paths(), vec!["devices/sensor_node_01/latest"]);

    b.store.fail_with = None;
    let r = b.tick(7_500, false);
    assert_eq!(r.upload, None, "no catch-up between cycles");
    let r = b.tick(10_000, false);
    assert_eq!(r.upload, Some(Ok(Ack { status: 200 })));

    assert_eq!(b.store.count_prefix("devices/sensor_node_01/latest"), 2);
    assert!(b.store.body_at("devices/sensor_node_01/history/5").is_none());
    let latest = b.store.body_at("devices/sensor_node_01/latest").unwrap();
    assert!(latest.contains(r#""timestamp":10"#), "latest: {latest}");
    assert_eq!(b.service.failed_uploads(), 1);
}

#[test]
fn undelivered_event_is_dropped_not_queued() {
    let mut b = Bench::new(MockStore::failing(SyncError::NotConnected));
    let r = b.tick(2_500, true);
    let (ev, result) = r.event.unwrap();
    assert_eq!(ev.timestamp_secs(), 2);
    assert_eq!(result, Err(SyncError::NotConnected));
    assert!(r.actuator.is_on);

    b.store.fail_with = None;
    for n in 2..=5u64 {
        b.tick(n * POLL_MS, false);
    }
    assert!(events_logged(&b.store).len() == 1, "only the original attempt");
    assert_eq!(b.service.dropped_events(), 1);
}

// ── Degraded readings ────────────────────────────────────────

#[test]
fn climate_failure_uses_sentinel_and_tick_continues() {
    let mut b = Bench::new(MockStore::new());
    let raw = RawSample {
        climate: Err(SensorError::ChecksumMismatch),
        ..RawSample::ok(22.0, 45.0, 480.0, true)
    };
    let r = b.tick_raw(2_500, raw);

    assert_eq!(r.reading.temperature_c, 0.0);
    assert_eq!(r.reading.humidity_pct, 0.0);
    assert_eq!(r.reading.gas_ppm, 480.0);
    assert!(r.reading.motion);
    assert!(r.actuator.is_on);
    assert!(r.event.is_some());
    assert_eq!(b.sink.count(|e| matches!(e, AppEvent::ReadingDegraded { .. })), 1);
}

#[test]
fn nan_gas_reading_is_replaced_by_sentinel_in_upload() {
    let mut b = Bench::new(MockStore::new());
    b.tick(2_500, false);
    let r = b.tick_raw(5_000, RawSample::ok(23.5, 40.0, f32::NAN, false));
    assert_eq!(r.reading.gas_ppm, 0.0);
    assert_eq!(r.reading.temperature_c, 23.5);
    let body = b.store.body_at("devices/sensor_node_01/latest").unwrap();
    assert!(body.contains(r#""gas_ppm":0.0"#), "body: {body}");
    assert!(body.contains(r#""temperature":23.5"#), "body: {body}");
}

// ── Relay ────────────────────────────────────────────────────

#[test]
fn failed_relay_write_is_retried_next_tick() {
    let mut b = Bench::new(MockStore::new());
    b.hw.fail_writes = 1;
    let r = b.tick(2_500, true);
    assert_eq!(r.actuator_write, Some(Err(ActuatorError::GpioWriteFailed)));
    assert!(!b.hw.relay_on());

    let r = b.tick(5_000, false);
    assert_eq!(r.actuator_write, Some(Ok(())));
    assert!(b.hw.relay_on());

    let r = b.tick(7_500, false);
    assert_eq!(r.actuator_write, None);
    assert_eq!(b.hw.cooling_writes(), vec![true, true]);
    assert_eq!(
        b.sink.count(|e| matches!(e, AppEvent::CoolingWriteFailed { wanted: true, .. })),
        1
    );
}

// ── Ordering: relay before network ───────────────────────────

type Journal = Rc<RefCell<Vec<String>>>;

struct JournalHw {
    journal: Journal,
    motion: bool,
}

impl SensorPort for JournalHw {
    fn read_raw(&mut self) -> RawSample {
        self.journal.borrow_mut().push("read".into());
        RawSample::ok(22.0, 45.0, 350.0, self.motion)
    }
}

impl ActuatorPort for JournalHw {
    fn set_cooling(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.journal.borrow_mut().push(format!("relay:{on}"));
        Ok(())
    }
}

struct JournalStore {
    journal: Journal,
}

impl StorePort for JournalStore {
    fn put(&mut self, path: &str, _body: &str) -> Result<Ack, SyncError> {
        self.journal.borrow_mut().push(format!("put:{path}"));
        Ok(Ack { status: 200 })
    }
}

#[test]
fn relay_is_driven_before_any_store_call() {
    let journal: Journal = Rc::default();
    let mut hw = JournalHw {
        journal: journal.clone(),
        motion: true,
    };
    let mut store = JournalStore {
        journal: journal.clone(),
    };
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();
    let mut service = NodeService::new(&SystemConfig::default(), node_id());
    service.start(&mut sink);

    clock.set(5_000);
    service.run_tick(&clock, &mut hw, &mut store, &mut sink);

    assert_eq!(
        *journal.borrow(),
        vec![
            "read",
            "relay:true",
            "put:events/sensor_node_01/5",
            "put:devices/sensor_node_01/latest",
            "put:devices/sensor_node_01/history/5",
        ]
    );
}

#[test]
fn started_event_carries_device_id() {
    let b = Bench::new(MockStore::new());
    assert!(matches!(
        b.sink.events.first(),
        Some(AppEvent::Started { device_id }) if device_id.as_str() == "sensor_node_01"
    ));
}
