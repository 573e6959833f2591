//! Cooling relay driver (single GPIO, configurable polarity).
//!
//! The pin is configured and driven to the off level by
//! [`hw_init::init_peripherals`](super::hw_init::init_peripherals); this
//! driver only switches it afterwards.

use log::debug;

#[cfg(target_os = "espidf")]
use super::hw_init;
use crate::error::ActuatorError;

pub struct CoolingRelay {
    gpio: i32,
    active_high: bool,
    on: bool,
    /// Simulation: make the next writes fail.
    #[cfg(not(target_os = "espidf"))]
    sim_fail: bool,
}

impl CoolingRelay {
    pub fn new(gpio: i32, active_high: bool) -> Self {
        Self {
            gpio,
            active_high,
            on: false,
            #[cfg(not(target_os = "espidf"))]
            sim_fail: false,
        }
    }

    /// Switch the relay. `self.is_on()` only changes if the write succeeded.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let level = on == self.active_high;
        self.write_level(level)?;
        self.on = on;
        debug!("Relay GPIO{} -> {} ({})", self.gpio, u8::from(level), if on { "on" } else { "off" });
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    #[cfg(target_os = "espidf")]
    fn write_level(&mut self, high: bool) -> Result<(), ActuatorError> {
        hw_init::gpio_write(self.gpio, high)
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_level(&mut self, _high: bool) -> Result<(), ActuatorError> {
        if self.sim_fail {
            return Err(ActuatorError::GpioWriteFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_fail(&mut self, fail: bool) {
        self.sim_fail = fail;
    }
}
