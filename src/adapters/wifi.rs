//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the link-state boundary the store
//! adapter checks before every request.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over `EspWifi`.
//! - **all other targets**: simulation stub with an injectable link state.
//!
//! ## Connection policy
//!
//! At boot: up to [`BOOT_CONNECT_ATTEMPTS`] blocking attempts,
//! [`BOOT_RETRY_DELAY_MS`] apart. Boot continues even if all fail; local
//! automation does not need the network. Afterwards [`ConnectivityPort::poll`]
//! issues a non-blocking reconnect at most every [`RECONNECT_INTERVAL_MS`]
//! while the link is down, so a dead access point never stalls a tick.

use core::fmt;
use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    /// Link is associated and has an IP.
    fn is_connected(&self) -> bool;
    /// Housekeeping once per tick. Must not block.
    fn poll(&mut self, now_ms: u64);
}

pub const BOOT_CONNECT_ATTEMPTS: u32 = 20;
pub const BOOT_RETRY_DELAY_MS: u32 = 500;
pub const RECONNECT_INTERVAL_MS: u64 = 30_000;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

#[derive(Clone)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut c = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        c.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        c.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(c)
    }

    /// Credentials baked in at build time (`SAFELABS_WIFI_SSID`,
    /// `SAFELABS_WIFI_PASSWORD`).
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        let ssid = option_env!("SAFELABS_WIFI_SSID").ok_or(ConnectivityError::NoCredentials)?;
        Self::new(ssid, option_env!("SAFELABS_WIFI_PASSWORD").unwrap_or(""))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiAdapter {
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    last_attempt_ms: u64,
    reconnects: u32,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
        credentials: &WifiCredentials,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            // Lengths were validated by WifiCredentials.
            ssid: credentials.ssid.as_str().try_into().unwrap_or_default(),
            password: credentials.password.as_str().try_into().unwrap_or_default(),
            auth_method: if credentials.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        }))?;
        wifi.start()?;
        info!("WiFi: started, SSID='{}'", credentials.ssid());

        Ok(Self {
            wifi,
            last_attempt_ms: 0,
            reconnects: 0,
        })
    }

    /// Blocking bring-up used once at boot.
    pub fn connect_at_boot(&mut self) -> Result<(), ConnectivityError> {
        for attempt in 1..=BOOT_CONNECT_ATTEMPTS {
            match self.wifi.connect().and_then(|()| self.wifi.wait_netif_up()) {
                Ok(()) => {
                    info!("WiFi: connected (attempt {})", attempt);
                    return Ok(());
                }
                Err(e) => {
                    warn!("WiFi: attempt {}/{} failed: {}", attempt, BOOT_CONNECT_ATTEMPTS, e);
                    esp_idf_svc::hal::delay::FreeRtos::delay_ms(BOOT_RETRY_DELAY_MS);
                }
            }
        }
        Err(ConnectivityError::ConnectionFailed)
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }
}

#[cfg(target_os = "espidf")]
impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn poll(&mut self, now_ms: u64) {
        if self.is_connected() || now_ms.saturating_sub(self.last_attempt_ms) < RECONNECT_INTERVAL_MS {
            return;
        }
        self.last_attempt_ms = now_ms;
        self.reconnects = self.reconnects.wrapping_add(1);
        // EspWifi::connect only kicks off association; it does not wait.
        match self.wifi.wifi_mut().connect() {
            Ok(()) => info!("WiFi: link down, reconnect #{} issued", self.reconnects),
            Err(e) => warn!("WiFi: reconnect #{} failed to start: {}", self.reconnects, e),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiAdapter {
    credentials: WifiCredentials,
    link_up: bool,
    last_attempt_ms: u64,
    reconnects: u32,
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new(credentials: &WifiCredentials) -> Self {
        Self {
            credentials: credentials.clone(),
            link_up: false,
            last_attempt_ms: 0,
            reconnects: 0,
        }
    }

    pub fn connect_at_boot(&mut self) -> Result<(), ConnectivityError> {
        self.link_up = true;
        info!("WiFi(sim): connected to '{}'", self.credentials.ssid());
        Ok(())
    }

    /// Simulate the access point appearing or vanishing.
    pub fn sim_set_link(&mut self, up: bool) {
        self.link_up = up;
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.link_up
    }

    fn poll(&mut self, now_ms: u64) {
        if self.link_up || now_ms.saturating_sub(self.last_attempt_ms) < RECONNECT_INTERVAL_MS {
            return;
        }
        self.last_attempt_ms = now_ms;
        self.reconnects = self.reconnects.wrapping_add(1);
        warn!("WiFi(sim): link down, reconnect #{} issued", self.reconnects);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
