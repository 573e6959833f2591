//! Automation Controller: occupancy → cooling relay.
//!
//! The decision is a pure function of occupancy. The controller separately
//! remembers what the hardware last acknowledged, so a write happens only
//! when the two differ. A failed write leaves the acknowledged state stale,
//! which makes the next tick issue the same command again.

use crate::fsm::context::OccupancyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub is_on: bool,
    /// Tick time of the last decision change.
    pub last_changed_ms: u64,
}

/// What the I/O shell must do to the relay this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Hardware already matches the decision.
    Hold,
    /// Drive the relay to this state.
    SetCooling(bool),
}

/// Cooling follows occupancy, nothing else.
pub fn decide(occupancy: &OccupancyState) -> bool {
    occupancy.is_occupied
}

pub struct AutomationController {
    state: ActuatorState,
    /// Last state the relay confirmed. The relay is driven off during
    /// peripheral init, so this starts at `false`.
    applied: bool,
}

impl AutomationController {
    pub fn new() -> Self {
        Self {
            state: ActuatorState {
                is_on: false,
                last_changed_ms: 0,
            },
            applied: false,
        }
    }

    /// Fold this tick's occupancy into the decision and derive the command.
    pub fn update(&mut self, occupancy: &OccupancyState, now_ms: u64) -> ActuatorCommand {
        let is_on = decide(occupancy);
        if is_on != self.state.is_on {
            self.state = ActuatorState {
                is_on,
                last_changed_ms: now_ms,
            };
        }
        if self.state.is_on == self.applied {
            ActuatorCommand::Hold
        } else {
            ActuatorCommand::SetCooling(self.state.is_on)
        }
    }

    /// The relay accepted `on`.
    pub fn confirm(&mut self, on: bool) {
        self.applied = on;
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// `false` while a failed write is waiting to be re-applied.
    pub fn in_sync(&self) -> bool {
        self.state.is_on == self.applied
    }
}

impl Default for AutomationController {
    fn default() -> Self {
        Self::new()
    }
}
