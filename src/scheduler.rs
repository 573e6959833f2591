//! Periodic cadence tracking for the poll loop.
//!
//! The node runs one tick per poll period; some work (the telemetry upload)
//! runs on a coarser period layered on top of the tick stream.
//!
//! ```text
//!  poll ticks:   2.5   5.0   7.5   10.0  12.5  15.0   (s)
//!  upload due:          ▲           ▲           ▲
//! ```
//!
//! A [`Cadence`] is pure bookkeeping: it never sleeps and never reads a
//! clock, the caller passes `now_ms`.

/// Fires when at least one interval has elapsed since the last firing.
///
/// The reference point starts at boot (`0`), so with a 5 s interval the first
/// firing is at the first tick with `now_ms >= 5000`. Firing is recorded by
/// [`Cadence::fire`] regardless of what the caller's work returned; missed
/// intervals are not made up.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u64,
    last_fired_ms: u64,
    fired_count: u32,
}

impl Cadence {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: 0,
            fired_count: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// `true` if the cadence would fire at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_fired_ms) >= self.interval_ms
    }

    /// Record a firing at `now_ms`.
    pub fn fire(&mut self, now_ms: u64) {
        self.last_fired_ms = now_ms;
        self.fired_count = self.fired_count.wrapping_add(1);
    }

    /// Check and record in one step. Returns whether the cadence fired.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.fire(now_ms);
            true
        } else {
            false
        }
    }

    pub fn fired_count(&self) -> u32 {
        self.fired_count
    }

    /// Milliseconds until the next firing as seen from `now_ms`.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.last_fired_ms + self.interval_ms).saturating_sub(now_ms)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
