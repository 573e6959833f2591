//! DHT22 (AM2302) temperature / humidity sensor on a single-wire bus.
//!
//! ```text
//!  host:   ‾‾‾|____ ≥1 ms ____|‾‾ release
//!  sensor:                        ‾‾|__80µs__|‾‾80µs‾‾|_50_|‾26µs‾|_50_|‾‾70µs‾‾| …
//!                                      response          bit 0       bit 1
//! ```
//!
//! 40 bits, MSB first: humidity ×10 (16 bit), temperature ×10 (15 bit +
//! sign bit), checksum (low byte of the sum of the first four bytes).
//!
//! Bits are classified by comparing each high phase with the preceding
//! 50 µs low phase, so the loop overhead of the polling delay cancels out.
//!
//! ## Dual-target design
//!
//! The frame capture is generic over `embedded-hal` 1.0 traits. On ESP-IDF
//! the [`ClimateSensor`] drives an open-drain `PinDriver` with `Ets` busy
//! waits; on host it returns a value injected with [`sim_set_climate`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::reading::ClimateSample;
use crate::error::SensorError;

/// Host start pulse length. Datasheet minimum is 1 ms.
const START_LOW_US: u32 = 1_100;
/// Upper bound on any single phase, well above the 80 µs maximum.
const PHASE_TIMEOUT_US: u32 = 100;

const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 80.0;

// ── Frame capture ─────────────────────────────────────────────

/// Run one start/response/data exchange and return the 5 raw bytes.
pub fn read_frame<P, D>(pin: &mut P, delay: &mut D) -> Result<[u8; 5], SensorError>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pin.set_low().map_err(|_| SensorError::GpioReadFailed)?;
    delay.delay_us(START_LOW_US);
    pin.set_high().map_err(|_| SensorError::GpioReadFailed)?;

    // Response: line floats high until the sensor pulls it low, then
    // 80 µs low and 80 µs high.
    wait_while(pin, delay, true)?;
    wait_while(pin, delay, false)?;
    wait_while(pin, delay, true)?;

    let mut frame = [0u8; 5];
    for bit in 0..40 {
        let low_us = wait_while(pin, delay, false)?;
        let high_us = wait_while(pin, delay, true)?;
        if high_us > low_us {
            frame[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    Ok(frame)
}

/// Spin while the line is at `level`; returns the microseconds spent.
fn wait_while<P, D>(pin: &mut P, delay: &mut D, level: bool) -> Result<u32, SensorError>
where
    P: InputPin,
    D: DelayNs,
{
    let mut elapsed = 0u32;
    while pin.is_high().map_err(|_| SensorError::GpioReadFailed)? == level {
        if elapsed >= PHASE_TIMEOUT_US {
            return Err(SensorError::NoResponse);
        }
        delay.delay_us(1);
        elapsed += 1;
    }
    Ok(elapsed)
}

// ── Frame decoding ────────────────────────────────────────────

pub fn decode_frame(frame: [u8; 5]) -> Result<ClimateSample, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity_pct = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature_c = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if !(0.0..=100.0).contains(&humidity_pct) || !(TEMP_MIN_C..=TEMP_MAX_C).contains(&temperature_c) {
        return Err(SensorError::OutOfRange);
    }

    Ok(ClimateSample {
        temperature_c,
        humidity_pct,
    })
}

// ── Driver ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use esp_idf_svc::hal::delay::Ets;
    use esp_idf_svc::hal::gpio::{AnyIOPin, InputOutput, PinDriver, Pull};
    use esp_idf_svc::sys::EspError;

    pub struct Bus {
        pub pin: PinDriver<'static, AnyIOPin, InputOutput>,
        pub delay: Ets,
    }

    impl Bus {
        pub fn new(gpio: i32) -> Result<Self, EspError> {
            // SAFETY: the pin number comes from `pins` and is claimed only here.
            let mut pin = PinDriver::input_output_od(unsafe { AnyIOPin::new(gpio) })?;
            pin.set_pull(Pull::Up)?;
            pin.set_high()?;
            Ok(Self { pin, delay: Ets })
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    // Defaults: 22.0 °C, 45.0 %RH.
    pub(super) static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41B0_0000);
    pub(super) static SIM_HUM_BITS: AtomicU32 = AtomicU32::new(0x4234_0000);
    pub(super) static SIM_OK: AtomicBool = AtomicBool::new(true);

    pub(super) fn load() -> Option<(f32, f32)> {
        SIM_OK.load(Ordering::Relaxed).then(|| {
            (
                f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
                f32::from_bits(SIM_HUM_BITS.load(Ordering::Relaxed)),
            )
        })
    }
}

/// Inject the next simulated conversion. `None` simulates a dead sensor.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(value: Option<(f32, f32)>) {
    use core::sync::atomic::Ordering;
    match value {
        Some((t, h)) => {
            platform::SIM_TEMP_BITS.store(t.to_bits(), Ordering::Relaxed);
            platform::SIM_HUM_BITS.store(h.to_bits(), Ordering::Relaxed);
            platform::SIM_OK.store(true, Ordering::Relaxed);
        }
        None => platform::SIM_OK.store(false, Ordering::Relaxed),
    }
}

pub struct ClimateSensor {
    #[cfg(target_os = "espidf")]
    bus: platform::Bus,
    gpio: i32,
}

impl ClimateSensor {
    #[cfg(target_os = "espidf")]
    pub fn new(gpio: i32) -> Result<Self, esp_idf_svc::sys::EspError> {
        Ok(Self {
            bus: platform::Bus::new(gpio)?,
            gpio,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// One conversion. Callers must leave ≥ 2 s between calls.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        let frame = read_frame(&mut self.bus.pin, &mut self.bus.delay)?;
        decode_frame(frame)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        let (temperature_c, humidity_pct) = platform::load().ok_or(SensorError::NoResponse)?;
        Ok(ClimateSample {
            temperature_c,
            humidity_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use std::rc::Rc;

    /// Scripted single-wire line. After the host releases the bus, the line
    /// follows `segments` (level, duration µs) on a shared virtual clock,
    /// then idles high.
    struct ScriptedLine {
        now: Rc<Cell<u64>>,
        released_at: Option<u64>,
        segments: Vec<(bool, u32)>,
    }

    struct VirtualDelay {
        now: Rc<Cell<u64>>,
    }

    impl embedded_hal::digital::ErrorType for ScriptedLine {
        type Error = Infallible;
    }

    impl InputPin for ScriptedLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            let Some(start) = self.released_at else {
                return Ok(false);
            };
            let mut t = self.now.get() - start;
            for &(level, dur) in &self.segments {
                if t < u64::from(dur) {
                    return Ok(level);
                }
                t -= u64::from(dur);
            }
            Ok(true)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    impl OutputPin for ScriptedLine {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.released_at = None;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.released_at = Some(self.now.get());
            Ok(())
        }
    }

    impl DelayNs for VirtualDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.now.set(self.now.get() + u64::from(ns.div_ceil(1_000)));
        }

        fn delay_us(&mut self, us: u32) {
            self.now.set(self.now.get() + u64::from(us));
        }
    }

    fn sensor_waveform(frame: [u8; 5]) -> Vec<(bool, u32)> {
        let mut s = vec![(true, 30), (false, 80), (true, 80)];
        for bit in 0..40 {
            let one = frame[bit / 8] & (0x80 >> (bit % 8)) != 0;
            s.push((false, 50));
            s.push((true, if one { 70 } else { 26 }));
        }
        s.push((false, 50));
        s
    }

    fn rig(segments: Vec<(bool, u32)>) -> (ScriptedLine, VirtualDelay) {
        let now = Rc::new(Cell::new(0));
        (
            ScriptedLine {
                now: Rc::clone(&now),
                released_at: None,
                segments,
            },
            VirtualDelay { now },
        )
    }

    const SAMPLE: [u8; 5] = [0x02, 0x8C, 0x01, 0x5F, 0xEE];

    #[test]
    fn captures_frame_from_waveform() {
        let (mut pin, mut delay) = rig(sensor_waveform(SAMPLE));
        assert_eq!(read_frame(&mut pin, &mut delay), Ok(SAMPLE));
    }

    #[test]
    fn silent_sensor_times_out() {
        let (mut pin, mut delay) = rig(Vec::new());
        assert_eq!(read_frame(&mut pin, &mut delay), Err(SensorError::NoResponse));
    }

    #[test]
    fn decodes_positive_reading() {
        let s = decode_frame(SAMPLE).unwrap();
        assert!((s.humidity_pct - 65.2).abs() < 0.01);
        assert!((s.temperature_c - 35.1).abs() < 0.01);
    }

    #[test]
    fn decodes_negative_temperature() {
        // 50.0 %RH, -10.1 °C
        let frame = [0x01, 0xF4, 0x80, 0x65, 0x01u8.wrapping_add(0xF4).wrapping_add(0x80).wrapping_add(0x65)];
        let s = decode_frame(frame).unwrap();
        assert!((s.temperature_c + 10.1).abs() < 0.01);
        assert!((s.humidity_pct - 50.0).abs() < 0.01);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut frame = SAMPLE;
        frame[4] ^= 0x01;
        assert_eq!(decode_frame(frame), Err(SensorError::ChecksumMismatch));
    }

    #[test]
    fn rejects_implausible_humidity() {
        // 110.0 %RH
        let frame = [0x04, 0x4C, 0x00, 0xC8, 0x04u8.wrapping_add(0x4C).wrapping_add(0xC8)];
        assert_eq!(decode_frame(frame), Err(SensorError::OutOfRange));
    }

    #[test]
    fn simulated_sensor_follows_injection() {
        let mut s = ClimateSensor::new(4);
        sim_set_climate(Some((19.5, 61.0)));
        let r = s.read().unwrap();
        assert!((r.temperature_c - 19.5).abs() < f32::EPSILON);
        assert!((r.humidity_pct - 61.0).abs() < f32::EPSILON);
        sim_set_climate(None);
        assert_eq!(s.read(), Err(SensorError::NoResponse));
        sim_set_climate(Some((22.0, 45.0)));
        assert_eq!(s.gpio(), 4);
    }
}
