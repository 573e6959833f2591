//! The service wired to the host builds of the real adapters: NVS config,
//! device id resolution, and the database store over a simulated link.

use safelabs::adapters::device_id::resolve_device_id;
use safelabs::adapters::nvs::NvsAdapter;
use safelabs::adapters::rtdb::{RtdbStore, StoreConfig};
use safelabs::adapters::wifi::{ConnectivityPort, WifiAdapter, WifiCredentials};
use safelabs::app::ports::ConfigPort;
use safelabs::app::service::NodeService;
use safelabs::config::{DeviceId, SystemConfig};
use safelabs::error::SyncError;

use crate::mock_hw::{ManualClock, MockHardware, RecordingSink};

fn offline_store() -> RtdbStore<WifiAdapter> {
    let creds = WifiCredentials::new("LabNet", "password1").unwrap();
    let config = StoreConfig::new("https://safelabs-demo.example.com", "s3cret", 2_000).unwrap();
    RtdbStore::new(config, WifiAdapter::new(&creds))
}

#[test]
fn link_down_skips_network_but_not_cooling() {
    let mut store = offline_store();
    let clock = ManualClock::new();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut service = NodeService::new(&SystemConfig::default(), resolve_device_id(&SystemConfig::default(), &[0; 6]));
    service.start(&mut sink);

    clock.set(5_000);
    hw.push_motion(true);
    let r = service.run_tick(&clock, &mut hw, &mut store, &mut sink);

    assert!(hw.relay_on());
    assert_eq!(r.event.map(|(_, res)| res), Some(Err(SyncError::NotConnected)));
    assert_eq!(r.upload, Some(Err(SyncError::NotConnected)));
    assert_eq!(store.requests(), 0);

    // Link comes back; the next upload cycle writes fresh documents.
    store.link_mut().connect_at_boot().unwrap();
    assert!(store.link().is_connected());
    clock.set(10_000);
    let r = service.run_tick(&clock, &mut hw, &mut store, &mut sink);
    assert!(matches!(r.upload, Some(Ok(_))));
    assert!(store.sim_document("devices/sensor_node_01/latest").is_some());
    assert!(store.sim_document("devices/sensor_node_01/history/10").is_some());
    assert!(store.sim_document("devices/sensor_node_01/history/5").is_none());
    // The missed event stays missed.
    assert!(store.sim_document("events/sensor_node_01/5").is_none());
}

#[test]
fn rejected_writes_are_reported_per_cycle() {
    let mut store = offline_store();
    store.link_mut().connect_at_boot().unwrap();
    store.sim_fail_with(Some(SyncError::Rejected { status: 401 }));

    let clock = ManualClock::new();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut service = NodeService::new(&SystemConfig::default(), resolve_device_id(&SystemConfig::default(), &[0; 6]));

    for n in 1..=4u64 {
        clock.set(n * 2_500);
        service.run_tick(&clock, &mut hw, &mut store, &mut sink);
    }
    // Cycles at 5 s and 10 s, one request each before the rejection stops it.
    assert_eq!(service.failed_uploads(), 2);
    assert_eq!(store.requests(), 2);
}

#[test]
fn persisted_config_drives_the_service() {
    let nvs = NvsAdapter::new();
    let cfg = SystemConfig {
        device_id: DeviceId::new(),
        occupancy_window_ms: 5_000,
        ..SystemConfig::default()
    };
    nvs.save(&cfg).unwrap();

    let loaded = nvs.load().unwrap();
    let id = resolve_device_id(&loaded, &[0x00, 0x11, 0x22, 0x0a, 0x0b, 0x0c]);
    assert_eq!(id.as_str(), "sensor_node_0a0b0c");

    let clock = ManualClock::new();
    let mut hw = MockHardware::new();
    let mut store = crate::mock_hw::MockStore::new();
    let mut sink = RecordingSink::new();
    let mut service = NodeService::new(&loaded, id);

    let mut on = Vec::new();
    for n in 1..=4u64 {
        clock.set(n * 2_500);
        hw.push_motion(n == 1);
        on.push(service.run_tick(&clock, &mut hw, &mut store, &mut sink).actuator.is_on);
    }
    // 5 s window: on at 2.5 s, still on at 5 s, off at 7.5 s.
    assert_eq!(on, vec![true, true, false, false]);
    assert_eq!(store.count_prefix("events/sensor_node_0a0b0c/"), 1);
}
