//! Occupancy state handlers and table builder.
//!
//! ```text
//!                 [motion]
//!  UNOCCUPIED ──────────────▶ OCCUPIED ──┐
//!      ▲                         │  ▲    │ [motion: refresh last_motion]
//!      │                         │  └────┘
//!      └── [now - last_motion >= window, no motion] ──┘
//! ```
//!
//! Motion is checked before expiry, so a pulse on the expiry tick keeps the
//! space occupied.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::debug;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Unoccupied
        StateDescriptor {
            id: StateId::Unoccupied,
            name: "Unoccupied",
            on_enter: Some(unoccupied_enter),
            on_exit: None,
            on_update: unoccupied_update,
        },
        // Index 1: Occupied
        StateDescriptor {
            id: StateId::Occupied,
            name: "Occupied",
            on_enter: Some(occupied_enter),
            on_exit: Some(occupied_exit),
            on_update: occupied_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNOCCUPIED state
// ═══════════════════════════════════════════════════════════════════════════

fn unoccupied_enter(ctx: &mut FsmContext) {
    ctx.occupancy.is_occupied = false;
    ctx.occupancy.occupied_since = None;
}

fn unoccupied_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.motion.then_some(StateId::Occupied)
}

// ═══════════════════════════════════════════════════════════════════════════
//  OCCUPIED state
// ═══════════════════════════════════════════════════════════════════════════

fn occupied_enter(ctx: &mut FsmContext) {
    ctx.occupancy.is_occupied = true;
    ctx.occupancy.occupied_since = Some(ctx.now_ms);
    ctx.occupancy.last_motion = Some(ctx.now_ms);
}

fn occupied_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.motion {
        ctx.occupancy.last_motion = Some(ctx.now_ms);
        return None;
    }
    if ctx.window_expired() {
        return Some(StateId::Unoccupied);
    }
    None
}

fn occupied_exit(ctx: &mut FsmContext) {
    if let Some(since) = ctx.occupancy.occupied_since {
        debug!(
            "Occupancy interval closed after {} ms",
            ctx.now_ms.saturating_sub(since)
        );
    }
}
