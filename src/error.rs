//! Unified error types for the SafeLabs node firmware.
//!
//! Each subsystem has a small `Copy` error enum so errors can be carried
//! through `AppEvent`s and tick reports without allocation. `Error` is the
//! umbrella every subsystem converts into.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor channel could not be read or returned implausible data.
    Sensor(SensorError),
    /// The cooling relay could not be switched.
    Actuator(ActuatorError),
    /// A store write failed.
    Sync(SyncError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Sync(e) => write!(f, "sync: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// DHT22 did not drive the expected level in time.
    NoResponse,
    /// DHT22 frame checksum mismatch.
    ChecksumMismatch,
    /// Value is NaN or outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// The relay driver was never initialised.
    NotInitialised,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::NotInitialised => write!(f, "relay not initialised"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Store sync errors
// ---------------------------------------------------------------------------

/// Outcome of a failed store write.
///
/// Transient conditions (`NotConnected`, `Timeout`, `Transport`) and
/// `Rejected` are reported at different log levels but handled identically:
/// the cycle is skipped and nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Link is down; no request was attempted.
    NotConnected,
    /// Request exceeded the network timeout.
    Timeout,
    /// Connection or I/O failure mid-request.
    Transport,
    /// The store answered with a non-success status (auth, rules, schema).
    Rejected { status: u16 },
    /// Record could not be serialised.
    Encode,
}

impl SyncError {
    /// `true` for failures that no amount of waiting will fix.
    pub const fn is_rejection(self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Encode)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Transport => write!(f, "transport error"),
            Self::Rejected { status } => write!(f, "rejected by store (HTTP {status})"),
            Self::Encode => write!(f, "record encoding failed"),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        Self::Sync(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_error_classification() {
        assert!(SyncError::Rejected { status: 401 }.is_rejection());
        assert!(SyncError::Encode.is_rejection());
        assert!(!SyncError::NotConnected.is_rejection());
        assert!(!SyncError::Timeout.is_rejection());
        assert!(!SyncError::Transport.is_rejection());
    }

    #[test]
    fn display_includes_subsystem() {
        let e: Error = SyncError::Rejected { status: 403 }.into();
        assert_eq!(e.to_string(), "sync: rejected by store (HTTP 403)");
        let e: Error = SensorError::ChecksumMismatch.into();
        assert_eq!(e.to_string(), "sensor: checksum mismatch");
    }
}
