//! System configuration parameters
//!
//! All tunable parameters for the SafeLabs sensor node. Defaults match the
//! reference lab installation; overrides are persisted in NVS.

use serde::{Deserialize, Serialize};

/// Store namespace key for one node. Also the `device_id` field of every
/// record the node writes.
pub type DeviceId = heapless::String<32>;

/// Device id used when nothing else is configured.
pub const DEFAULT_DEVICE_ID: &str = "sensor_node_01";

/// Full-scale count of the 12-bit gas ADC.
pub const GAS_ADC_MAX: u16 = 4095;

/// Store requests one tick can block on: the security event, then the
/// latest and history records.
pub const MAX_STORE_PUTS_PER_TICK: u32 = 3;

/// Per-request allowance for DNS, TCP connect and the TLS handshake on top
/// of `network_timeout_ms`.
pub const REQUEST_SETUP_MS: u32 = 1_500;

/// Longest accepted `network_timeout_ms`.
pub const MAX_NETWORK_TIMEOUT_MS: u32 = 5_000;

/// Shortest task watchdog period; also the boot hold time before a restart.
pub const MIN_WATCHDOG_TIMEOUT_MS: u32 = 10_000;

/// Slack between the longest expected feed gap and the watchdog period.
pub const WATCHDOG_MARGIN_MS: u32 = 5_000;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Store namespace key. Empty means "derive from MAC".
    pub device_id: DeviceId,

    // --- Timing ---
    /// Sensor poll / automation tick period (milliseconds)
    pub poll_interval_ms: u32,
    /// Telemetry upload period (milliseconds)
    pub upload_interval_ms: u32,
    /// Occupancy extension window after the last motion pulse (milliseconds)
    pub occupancy_window_ms: u32,
    /// Upper bound on a single store request (milliseconds)
    pub network_timeout_ms: u32,

    // --- Gas sensor mapping ---
    /// Concentration reported at ADC count 0 (ppm)
    pub gas_ppm_min: u16,
    /// Concentration reported at ADC full scale (ppm)
    pub gas_ppm_max: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_id = DeviceId::new();
        // Fits: 14 bytes into a 32-byte buffer.
        let _ = device_id.push_str(DEFAULT_DEVICE_ID);
        Self {
            device_id,

            // Timing
            poll_interval_ms: 2_500,
            upload_interval_ms: 5_000,
            occupancy_window_ms: 15_000,
            network_timeout_ms: 2_000,

            // Gas
            gas_ppm_min: 200,
            gas_ppm_max: 1_000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.
    ///
    /// An empty `device_id` is accepted here; identity resolution replaces it
    /// with the MAC-derived id at boot.
    pub fn validate(&self) -> Result<(), &'static str> {
        // DHT22 needs at least 2 s between conversions.
        if !(2_000..=60_000).contains(&self.poll_interval_ms) {
            return Err("poll_interval_ms out of range [2000, 60000]");
        }
        if self.upload_interval_ms < self.poll_interval_ms {
            return Err("upload_interval_ms must be >= poll_interval_ms");
        }
        if self.upload_interval_ms > 3_600_000 {
            return Err("upload_interval_ms out of range (max 1 h)");
        }
        if !(1_000..=3_600_000).contains(&self.occupancy_window_ms) {
            return Err("occupancy_window_ms out of range [1000, 3600000]");
        }
        if !(100..=MAX_NETWORK_TIMEOUT_MS).contains(&self.network_timeout_ms) {
            return Err("network_timeout_ms out of range [100, 5000]");
        }
        if self.gas_ppm_min >= self.gas_ppm_max {
            return Err("gas_ppm_min must be < gas_ppm_max");
        }
        if !self.device_id.is_empty() && !is_valid_device_id(&self.device_id) {
            return Err("device_id contains characters not allowed in store keys");
        }
        Ok(())
    }

    /// Worst-case time one tick spends blocked on store requests.
    pub fn tick_network_budget_ms(&self) -> u32 {
        MAX_STORE_PUTS_PER_TICK.saturating_mul(self.network_timeout_ms.saturating_add(REQUEST_SETUP_MS))
    }

    /// Task watchdog period.
    ///
    /// Feeds are one loop iteration apart: at most a poll period of sleep
    /// plus one tick. The period covers that with [`WATCHDOG_MARGIN_MS`] to
    /// spare and never drops below [`MIN_WATCHDOG_TIMEOUT_MS`].
    pub fn watchdog_timeout_ms(&self) -> u32 {
        self.poll_interval_ms
            .saturating_add(self.tick_network_budget_ms())
            .saturating_add(WATCHDOG_MARGIN_MS)
            .max(MIN_WATCHDOG_TIMEOUT_MS)
    }
}

/// Store keys must be 1-32 printable ASCII bytes, excluding `. / # $ [ ]`.
pub fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 32
        && id
            .bytes()
            .all(|b| (0x21..=0x7E).contains(&b) && !matches!(b, b'.' | b'/' | b'#' | b'$' | b'[' | b']'))
}
