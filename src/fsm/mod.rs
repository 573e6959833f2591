//! Function-pointer finite state machine engine for the occupancy timer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Unoccupied │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Occupied   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  └────────────┴───────────┴──────────┴───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and reports the
//! [`Transition`] to the caller.  Handlers see only the [`FsmContext`];
//! time arrives through `ctx.now_ms`, never from a clock.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Occupancy states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Unoccupied = 0,
    Occupied = 1,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert a table index back to `StateId`.  Out-of-range indices fall
    /// back to `Unoccupied` in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Unoccupied,
            1 => Self::Occupied,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Unoccupied
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Per-tick update handler. Returns `Some(next)` to trigger a transition.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// A state change produced by [`Fsm::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    /// Tick time at which the transition happened.
    pub at_ms: u64,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    /// `ctx.now_ms` when the current state was entered.
    state_entry_ms: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_ms: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        self.state_entry_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// The caller sets `ctx.now_ms` and `ctx.motion` beforehand. At most one
    /// transition happens per tick.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> Option<Transition> {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx)?;
        let from = self.current_state();
        if next == from {
            return None;
        }
        self.transition(next, ctx);
        Some(Transition {
            from,
            to: next,
            at_ms: ctx.now_ms,
        })
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Milliseconds spent in the current state as of `now_ms`.
    pub fn time_in_current_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_entry_ms)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {} at {} ms",
            self.table[self.current].name, self.table[next_idx].name, ctx.now_ms
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
