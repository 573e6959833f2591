//! Shared mutable context threaded through every FSM handler.
//!
//! The driver writes `now_ms` and `motion` before each tick; state handlers
//! own `occupancy`.

// ---------------------------------------------------------------------------
// Occupancy state (written only by state handlers)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyState {
    pub is_occupied: bool,
    /// Entry time of the current occupied interval.
    pub occupied_since: Option<u64>,
    /// Most recent motion pulse. Survives expiry.
    pub last_motion: Option<u64>,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Inputs for this tick --
    /// Monotonic milliseconds since boot.
    pub now_ms: u64,
    /// A motion pulse was observed this tick.
    pub motion: bool,

    // -- Configuration --
    /// Extension window after the last pulse (milliseconds).
    pub window_ms: u64,

    // -- Output --
    pub occupancy: OccupancyState,
}

impl FsmContext {
    pub fn new(window_ms: u64) -> Self {
        Self {
            now_ms: 0,
            motion: false,
            window_ms,
            occupancy: OccupancyState::default(),
        }
    }

    /// `true` once the extension window after the last pulse has elapsed.
    pub fn window_expired(&self) -> bool {
        match self.occupancy.last_motion {
            Some(last) => self.now_ms.saturating_sub(last) >= self.window_ms,
            None => true,
        }
    }
}
