//! SafeLabs sensor node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the adapters
//! the binary wires together. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; host builds get
//! simulation twins.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;
