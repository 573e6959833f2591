//! Realtime-database store adapter.
//!
//! Implements [`StorePort`] as a JSON `PUT` to
//! `{base_url}/{path}.json?auth={secret}`, the REST surface of a hosted
//! realtime database. Every request is a whole-document write, so a retry
//! or a duplicate never corrupts the tree.
//!
//! The adapter owns the link ([`ConnectivityPort`]) and fails fast with
//! [`SyncError::NotConnected`] when it is down, so a missing access point
//! costs nothing on the tick path.
//!
//! Status mapping: 2xx is success; anything else is
//! [`SyncError::Rejected`] with the code (401/403 mean the secret is wrong).

use log::debug;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::adapters::wifi::ConnectivityPort;
use crate::app::ports::{Ack, StorePort};
use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreConfigError {
    MissingUrl,
    InvalidUrl,
}

impl core::fmt::Display for StoreConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "database URL not configured"),
            Self::InvalidUrl => write!(f, "database URL must start with https:// or http://"),
        }
    }
}

impl core::error::Error for StoreConfigError {}

/// Where and as whom to write.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    base_url: String,
    auth_token: String,
    pub timeout_ms: u32,
}

impl StoreConfig {
    pub fn new(base_url: &str, auth_token: &str, timeout_ms: u32) -> Result<Self, StoreConfigError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(StoreConfigError::MissingUrl);
        }
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(StoreConfigError::InvalidUrl);
        }
        Ok(Self {
            base_url: base_url.to_string(),
            auth_token: auth_token.trim().to_string(),
            timeout_ms,
        })
    }

    /// From `SAFELABS_RTDB_URL` / `SAFELABS_RTDB_SECRET` at build time.
    pub fn from_build_env(timeout_ms: u32) -> Result<Self, StoreConfigError> {
        let url = option_env!("SAFELABS_RTDB_URL").ok_or(StoreConfigError::MissingUrl)?;
        Self::new(url, option_env!("SAFELABS_RTDB_SECRET").unwrap_or(""), timeout_ms)
    }

    /// Full request URL for a record path.
    pub fn request_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.auth_token.is_empty() {
            format!("{}/{}.json", self.base_url, path)
        } else {
            format!("{}/{}.json?auth={}", self.base_url, path, self.auth_token)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl core::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Map an HTTP status to the port outcome.
///
/// Throttling and server-side errors are transient; the remaining 4xx
/// codes (bad secret, bad path, bad body) are rejections.
pub fn classify_status(status: u16) -> Result<Ack, SyncError> {
    match status {
        200..=299 => Ok(Ack { status }),
        408 => Err(SyncError::Timeout),
        429 | 500..=599 => Err(SyncError::Transport),
        _ => Err(SyncError::Rejected { status }),
    }
}

pub struct RtdbStore<C: ConnectivityPort> {
    config: StoreConfig,
    link: C,
    requests: u32,
    #[cfg(not(target_os = "espidf"))]
    sim: sim::SimBackend,
}

impl<C: ConnectivityPort> RtdbStore<C> {
    pub fn new(config: StoreConfig, link: C) -> Self {
        Self {
            config,
            link,
            requests: 0,
            #[cfg(not(target_os = "espidf"))]
            sim: sim::SimBackend::default(),
        }
    }

    pub fn link(&self) -> &C {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut C {
        &mut self.link
    }

    /// Requests actually sent (fast-fails excluded).
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl<C: ConnectivityPort> StorePort for RtdbStore<C> {
    fn put(&mut self, path: &str, body: &str) -> Result<Ack, SyncError> {
        if !self.link.is_connected() {
            return Err(SyncError::NotConnected);
        }
        self.requests = self.requests.wrapping_add(1);
        debug!("RTDB: PUT {} ({} bytes)", path, body.len());
        let url = self.config.request_url(path);
        self.send(&url, path, body)
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP transport (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl<C: ConnectivityPort> RtdbStore<C> {
    fn send(&mut self, url: &str, _path: &str, body: &str) -> Result<Ack, SyncError> {
        use core::time::Duration;
        use embedded_svc::http::client::Client as HttpClient;
        use embedded_svc::http::{Method, Status};
        use embedded_svc::io::Write;
        use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

        let http_conf = HttpClientConfiguration {
            timeout: Some(Duration::from_millis(u64::from(self.config.timeout_ms))),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&http_conf).map_err(|e| {
            warn!("RTDB: connection setup failed: {}", e);
            SyncError::Transport
        })?;
        let mut client = HttpClient::wrap(conn);

        let content_length = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", content_length.as_str()),
        ];
        let mut request = client
            .request(Method::Put, url, &headers)
            .map_err(|e| io_error(e.0))?;
        request.write_all(body.as_bytes()).map_err(|e| io_error(e.0))?;
        request.flush().map_err(|e| io_error(e.0))?;
        let response = request.submit().map_err(|e| io_error(e.0))?;

        classify_status(response.status())
    }
}

#[cfg(target_os = "espidf")]
fn io_error(e: esp_idf_svc::sys::EspError) -> SyncError {
    use esp_idf_svc::sys::{ESP_ERR_HTTP_EAGAIN, ESP_ERR_TIMEOUT};
    let code = e.code();
    if code == ESP_ERR_TIMEOUT as i32 || code == ESP_ERR_HTTP_EAGAIN as i32 {
        SyncError::Timeout
    } else {
        warn!("RTDB: transport error: {}", e);
        SyncError::Transport
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory transport (simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::collections::HashMap;

    use crate::error::SyncError;

    #[derive(Default)]
    pub(super) struct SimBackend {
        pub documents: HashMap<String, String>,
        pub fail_with: Option<SyncError>,
    }
}

#[cfg(not(target_os = "espidf"))]
impl<C: ConnectivityPort> RtdbStore<C> {
    fn send(&mut self, url: &str, path: &str, body: &str) -> Result<Ack, SyncError> {
        if let Some(error) = self.sim.fail_with {
            return Err(error);
        }
        debug!("RTDB(sim): {}", url);
        self.sim
            .documents
            .insert(path.trim_start_matches('/').to_string(), body.to_string());
        classify_status(200)
    }

    /// Simulation: make every subsequent request fail with `error`.
    pub fn sim_fail_with(&mut self, error: Option<SyncError>) {
        self.sim.fail_with = error;
    }

    /// Simulation: current document at `path`.
    pub fn sim_document(&self, path: &str) -> Option<&str> {
        self.sim.documents.get(path).map(String::as_str)
    }
}
