//! PIR motion sensor (HC-SR501) on a digital input.
//!
//! The GPIO interrupt latches every rising edge into an atomic, so a pulse
//! that starts and ends between two polls still counts. A read reports
//! motion if the line is high now or an edge was latched since the last
//! read, and clears the latch.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

/// Rising edge seen since the last read. Written from the GPIO ISR.
static MOTION_LATCH: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
static SIM_PIR_LEVEL: AtomicBool = AtomicBool::new(false);

/// Lock-free: safe to call from interrupt context.
pub fn latch_motion_from_isr() {
    MOTION_LATCH.store(true, Ordering::Release);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pir_level(high: bool) {
    SIM_PIR_LEVEL.store(high, Ordering::Relaxed);
}

pub struct MotionSensor {
    gpio: i32,
}

impl MotionSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn read(&mut self) -> Result<bool, SensorError> {
        let level = self.level();
        let latched = MOTION_LATCH.swap(false, Ordering::AcqRel);
        Ok(level || latched)
    }

    #[cfg(target_os = "espidf")]
    fn level(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self) -> bool {
        let _ = self.gpio;
        SIM_PIR_LEVEL.load(Ordering::Relaxed)
    }
}
