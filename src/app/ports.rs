//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (sensors, relay, store, clock, event sinks, config
//! storage) implement these traits. The [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the domain core never touches hardware or
//! the network directly.

use crate::config::SystemConfig;
use crate::error::{ActuatorError, SyncError};

use super::reading::RawSample;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source shared by every component.
pub trait Clock {
    /// Milliseconds since boot. Never goes backwards.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// One acquisition per channel. Failures are reported per channel,
    /// never retried here.
    fn read_raw(&mut self) -> RawSample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Drive the cooling relay.
    fn set_cooling(&mut self, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Store port (driven adapter: domain → remote datastore)
// ───────────────────────────────────────────────────────────────

/// Acknowledgement of a successful store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Transport status code (HTTP status for the RTDB adapter).
    pub status: u16,
}

/// Opaque `send(path, record)` capability.
///
/// Implementations own transport, auth and timeouts. A call returns within
/// the configured network timeout; exceeding it is `SyncError::Timeout`.
/// Callers never retry.
pub trait StorePort {
    /// Write `body` (a JSON document) at `path`, replacing what was there.
    fn put(&mut self, path: &str, body: &str) -> Result<Ack, SyncError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. This is the operator-visible channel.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting and reject out-of-range
/// values with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
