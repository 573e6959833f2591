//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the cooling relay, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::reading::RawSample;
use crate::drivers::relay::CoolingRelay;
use crate::error::ActuatorError;
use crate::sensors::SensorHub;

pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    relay: CoolingRelay,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, relay: CoolingRelay) -> Self {
        Self { sensor_hub, relay }
    }

    pub fn relay(&self) -> &CoolingRelay {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut CoolingRelay {
        &mut self.relay
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_raw(&mut self) -> RawSample {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_cooling(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay.set(on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;
    use crate::sensors::dht22::ClimateSensor;
    use crate::sensors::gas::GasSensor;
    use crate::sensors::motion::MotionSensor;

    fn adapter() -> HardwareAdapter {
        let hub = SensorHub::new(
            ClimateSensor::new(4),
            GasSensor::new(6, &SystemConfig::default()),
            MotionSensor::new(27),
        );
        HardwareAdapter::new(hub, CoolingRelay::new(26, true))
    }

    #[test]
    fn cooling_writes_reach_relay() {
        let mut hw = adapter();
        hw.set_cooling(true).unwrap();
        assert!(hw.relay().is_on());
        hw.relay_mut().sim_set_fail(true);
        assert_eq!(hw.set_cooling(false), Err(ActuatorError::GpioWriteFailed));
        assert!(hw.relay().is_on());
    }
}
