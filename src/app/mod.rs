//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the sensor node: reading assembly, occupancy-driven
//! cooling, telemetry upload and security-event logging. All interaction
//! with hardware, the clock and the remote store happens through the
//! **port traits** in [`ports`], keeping this layer testable without real
//! peripherals or a network.

pub mod automation;
pub mod event_log;
pub mod events;
pub mod ports;
pub mod reading;
pub mod records;
pub mod service;
pub mod sync;
