//! Device identity.
//!
//! A configured id always wins. Without one, the id is derived from the
//! factory MAC: `sensor_node_xxyyzz` (last 3 bytes, lowercase hex), stable
//! across reboots and unique per board.

use core::fmt::Write;

use log::{info, warn};

use crate::config::{DeviceId, SystemConfig, is_valid_device_id};

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: mac is a 6-byte buffer as the API requires.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive `sensor_node_xxyyzz` from the last 3 MAC bytes.
pub fn mac_device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    // 18 bytes always fit.
    let _ = write!(id, "sensor_node_{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

/// Pick the id this node writes under.
pub fn resolve_device_id(config: &SystemConfig, mac: &MacAddress) -> DeviceId {
    if config.device_id.is_empty() {
        let id = mac_device_id(mac);
        info!("Device id derived from MAC: {}", id);
        return id;
    }
    if !is_valid_device_id(&config.device_id) {
        let id = mac_device_id(mac);
        warn!(
            "Configured device id '{}' is not a valid store key, using {}",
            config.device_id, id
        );
        return id;
    }
    config.device_id.clone()
}
