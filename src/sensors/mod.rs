//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces one [`RawSample`] per tick.
//! Each channel is acquired exactly once; failures are passed up per
//! channel for the Sensor Reader to resolve.

pub mod dht22;
pub mod gas;
pub mod motion;

use crate::app::reading::RawSample;
use dht22::ClimateSensor;
use gas::GasSensor;
use motion::MotionSensor;

pub struct SensorHub {
    pub climate: ClimateSensor,
    pub gas: GasSensor,
    pub motion: MotionSensor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(climate: ClimateSensor, gas: GasSensor, motion: MotionSensor) -> Self {
        Self {
            climate,
            gas,
            motion,
        }
    }

    pub fn read_all(&mut self) -> RawSample {
        RawSample {
            climate: self.climate.read(),
            gas_ppm: self.gas.read(),
            motion: self.motion.read(),
        }
    }
}
