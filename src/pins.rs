//! GPIO / peripheral pin assignments for the SafeLabs sensor node
//! (ESP32-WROOM-32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: Digital
// ---------------------------------------------------------------------------

/// DHT22 temperature/humidity sensor, single-wire bus (open drain, 10 kΩ
/// external pull-up).
pub const DHT22_GPIO: i32 = 4;

/// HC-SR501 PIR motion sensor. HIGH = motion. Interrupt on rising edge.
pub const PIR_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// MQ-series gas sensor analog output.
/// ADC1 channel 6 (GPIO 34, input-only pin on the ESP32).
pub const GAS_ADC_GPIO: i32 = 34;
pub const GAS_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Relay module switching the lab cooling unit. Active HIGH.
pub const COOLING_RELAY_GPIO: i32 = 26;
pub const COOLING_RELAY_ACTIVE_HIGH: bool = true;
