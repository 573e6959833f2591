//! Sensor Reader: turns one raw acquisition into a [`Reading`].
//!
//! Each channel resolves to success or failure independently. A failed
//! channel is replaced by the sentinel `0.0` (`false` for motion), flagged in
//! [`Reading::faults`], logged, and the tick carries on. Nothing is retried
//! within a tick.

use log::warn;

use crate::error::SensorError;

/// Value substituted for a failed analog channel.
pub const SENTINEL: f32 = 0.0;

// ───────────────────────────────────────────────────────────────
// Raw inputs (one acquisition per channel, as delivered by SensorPort)
// ───────────────────────────────────────────────────────────────

/// Temperature and humidity from a single DHT22 conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// One raw acquisition of every channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub climate: Result<ClimateSample, SensorError>,
    pub gas_ppm: Result<f32, SensorError>,
    pub motion: Result<bool, SensorError>,
}

impl RawSample {
    /// All channels healthy.
    pub fn ok(temperature_c: f32, humidity_pct: f32, gas_ppm: f32, motion: bool) -> Self {
        Self {
            climate: Ok(ClimateSample {
                temperature_c,
                humidity_pct,
            }),
            gas_ppm: Ok(gas_ppm),
            motion: Ok(motion),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Channel faults
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelFault {
    /// Temperature and humidity share one sensor and fail together.
    Climate = 0b0000_0001,
    Gas = 0b0000_0010,
    Motion = 0b0000_0100,
}

impl ChannelFault {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

// ───────────────────────────────────────────────────────────────
// Reading
// ───────────────────────────────────────────────────────────────

/// One poll's worth of sensor data, immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Monotonic milliseconds since boot.
    pub timestamp_ms: u64,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub gas_ppm: f32,
    pub motion: bool,
    /// Bitmask of [`ChannelFault`]s.
    pub faults: u8,
}

impl Reading {
    pub fn is_degraded(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: ChannelFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Whole seconds since boot, as written to the store.
    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp_ms / 1_000
    }
}

// ───────────────────────────────────────────────────────────────
// SensorReader
// ───────────────────────────────────────────────────────────────

/// Stateless apart from a failure counter kept for diagnostics.
#[derive(Debug, Default)]
pub struct SensorReader {
    degraded_reads: u32,
}

impl SensorReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the reading for the tick at `now_ms`.
    pub fn read(&mut self, now_ms: u64, raw: RawSample) -> Reading {
        let mut faults = 0u8;

        let (temperature_c, humidity_pct) = match raw.climate {
            Ok(c) if c.temperature_c.is_finite() && c.humidity_pct.is_finite() => {
                (c.temperature_c, c.humidity_pct)
            }
            Ok(_) => {
                warn!("DHT22 returned a non-finite value, substituting sentinel");
                faults |= ChannelFault::Climate.mask();
                (SENTINEL, SENTINEL)
            }
            Err(e) => {
                warn!("DHT22 read failed: {}", e);
                faults |= ChannelFault::Climate.mask();
                (SENTINEL, SENTINEL)
            }
        };

        let gas_ppm = match raw.gas_ppm {
            Ok(ppm) if ppm.is_finite() => ppm,
            Ok(_) => {
                warn!("Gas sensor returned a non-finite value, substituting sentinel");
                faults |= ChannelFault::Gas.mask();
                SENTINEL
            }
            Err(e) => {
                warn!("Gas sensor read failed: {}", e);
                faults |= ChannelFault::Gas.mask();
                SENTINEL
            }
        };

        let motion = raw.motion.unwrap_or_else(|e| {
            warn!("PIR read failed: {}", e);
            faults |= ChannelFault::Motion.mask();
            false
        });

        if faults != 0 {
            self.degraded_reads = self.degraded_reads.wrapping_add(1);
        }

        Reading {
            timestamp_ms: now_ms,
            temperature_c,
            humidity_pct,
            gas_ppm,
            motion,
            faults,
        }
    }

    /// Number of readings with at least one failed channel since boot.
    pub fn degraded_reads(&self) -> u32 {
        self.degraded_reads
    }
}
