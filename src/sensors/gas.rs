//! Analog gas sensor (MQ-series module) on ADC1.
//!
//! The raw 12-bit count is mapped linearly onto the configured ppm range
//! with integer arithmetic, the same scaling the lab dashboard was
//! calibrated against. No warm-up compensation.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::{GAS_ADC_MAX, SystemConfig};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(1024);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

pub struct GasSensor {
    channel: u32,
    ppm_min: u16,
    ppm_max: u16,
}

impl GasSensor {
    pub fn new(channel: u32, config: &SystemConfig) -> Self {
        Self {
            channel,
            ppm_min: config.gas_ppm_min,
            ppm_max: config.gas_ppm_max,
        }
    }

    pub fn read(&self) -> Result<f32, SensorError> {
        let raw = self.read_adc()?;
        self.adc_to_ppm(raw)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        let _ = self.channel;
        Ok(SIM_GAS_ADC.load(Ordering::Relaxed))
    }

    /// `min + raw * (max - min) / 4095`, truncating.
    pub fn adc_to_ppm(&self, raw: u16) -> Result<f32, SensorError> {
        if raw > GAS_ADC_MAX {
            return Err(SensorError::OutOfRange);
        }
        let span = u32::from(self.ppm_max - self.ppm_min);
        let ppm = u32::from(self.ppm_min) + u32::from(raw) * span / u32::from(GAS_ADC_MAX);
        Ok(ppm as f32)
    }
}
