//! SafeLabs Sensor Node: Main Entry Point
//!
//! Hexagonal architecture with a fixed-period poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Clock      │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (Clock)         │
//! │  RtdbStore<WifiAdapter>                                        │
//! │  (Store + Connectivity)                                        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService                               │    │
//! │  │  AutomationCore (Reader · Occupancy FSM · Controller)  │    │
//! │  │  SyncUploader · EventLogger                            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Cadence (poll period) · Watchdog                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use safelabs::adapters::device_id;
use safelabs::adapters::hardware::HardwareAdapter;
use safelabs::adapters::log_sink::LogEventSink;
use safelabs::adapters::nvs::NvsAdapter;
use safelabs::adapters::rtdb::{RtdbStore, StoreConfig};
use safelabs::adapters::time::Esp32Clock;
use safelabs::adapters::wifi::{ConnectivityPort, WifiAdapter, WifiCredentials};
use safelabs::app::ports::{Clock, ConfigPort};
use safelabs::app::service::NodeService;
use safelabs::config::{SystemConfig, MIN_WATCHDOG_TIMEOUT_MS};
use safelabs::drivers::hw_init;
use safelabs::drivers::relay::CoolingRelay;
use safelabs::drivers::watchdog::Watchdog;
use safelabs::pins;
use safelabs::scheduler::Cadence;
use safelabs::sensors::dht22::ClimateSensor;
use safelabs::sensors::gas::GasSensor;
use safelabs::sensors::motion::MotionSensor;
use safelabs::sensors::SensorHub;

/// Hold the boot log on the console for one watchdog period, then restart.
fn halt_and_restart() -> ! {
    FreeRtos::delay_ms(MIN_WATCHDOG_TIMEOUT_MS);
    esp_idf_svc::hal::reset::restart()
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SafeLabs sensor node v{}         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}; restarting in {} ms", e, MIN_WATCHDOG_TIMEOUT_MS);
        halt_and_restart();
    }
    if let Err(e) = hw_init::init_isr_service() {
        // Motion still works by level polling; only short pulses can be missed.
        warn!("ISR service init failed: {}; continuing with level polling", e);
    }

    // ── 3. Config (NVS or defaults) ───────────────────────────
    let nvs = NvsAdapter::new();
    let config = match nvs.load() {
        Ok(cfg) => match cfg.validate() {
            Ok(()) => cfg,
            Err(reason) => {
                warn!("Stored config invalid ({}), using defaults", reason);
                SystemConfig::default()
            }
        },
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. Device identity ────────────────────────────────────
    let mac = device_id::read_mac();
    let dev_id = device_id::resolve_device_id(&config, &mac);
    info!("Device ID: {}", dev_id);

    // ── 5. Network ────────────────────────────────────────────
    let credentials = WifiCredentials::from_build_env()?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs_partition, &credentials)?;
    if let Err(e) = wifi.connect_at_boot() {
        // Local automation runs without the network; the loop keeps retrying.
        warn!("{}; starting offline", e);
    }
    let store_config = StoreConfig::from_build_env(config.network_timeout_ms)?;
    info!("Store: {}", store_config.base_url());
    let mut store = RtdbStore::new(store_config, wifi);

    // ── 6. Sensors and actuator ───────────────────────────────
    let sensor_hub = SensorHub::new(
        ClimateSensor::new(pins::DHT22_GPIO)?,
        GasSensor::new(pins::GAS_ADC_CHANNEL, &config),
        MotionSensor::new(pins::PIR_GPIO),
    );
    let relay = CoolingRelay::new(pins::COOLING_RELAY_GPIO, pins::COOLING_RELAY_ACTIVE_HIGH);
    let mut hw = HardwareAdapter::new(sensor_hub, relay);

    // ── 7. Service ────────────────────────────────────────────
    let clock = Esp32Clock::new();
    let mut log_sink = LogEventSink::new();
    let mut service = NodeService::new(&config, dev_id);
    service.start(&mut log_sink);

    let mut watchdog = Watchdog::for_config(&config);
    let mut poll = Cadence::new(u64::from(config.poll_interval_ms));

    info!(
        "System ready. Poll every {} ms, upload every {} ms, occupancy window {} ms, store budget {} ms/tick",
        config.poll_interval_ms,
        config.upload_interval_ms,
        config.occupancy_window_ms,
        config.tick_network_budget_ms()
    );

    // ── 8. Poll loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.now_ms();
        if poll.poll(now_ms) {
            service.run_tick(&clock, &mut hw, &mut store, &mut log_sink);
        }

        store.link_mut().poll(clock.now_ms());
        watchdog.feed(clock.now_ms());

        let remaining = poll.remaining_ms(clock.now_ms());
        FreeRtos::delay_ms(u32::try_from(remaining.max(1)).unwrap_or(u32::MAX));
    }
}
