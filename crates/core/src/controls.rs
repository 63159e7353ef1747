//! Control-enablement state machine gating user actions.
//!
//! The gate has exactly two states. While `Locked`, every path-mutating and
//! session-mutating control is non-operable. Leaving `Locked` *recomputes*
//! enablement from current data instead of restoring a snapshot, so a
//! session change that happened while locked can never leave stale
//! enablement behind.

use crate::paths;

/// Pure enablement record consumed by any rendering layer. `true` means the
/// control is operable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub analyze: bool,
    pub refresh: bool,
    pub navigate_up: bool,
    pub path_input: bool,
    pub activate_session: bool,
    pub session_selector: bool,
    pub load_selected: bool,
    pub delete_selected: bool,
    pub clear_session: bool,
}

impl ControlState {
    /// Everything disabled; emitted while a request is in flight.
    pub fn locked() -> Self {
        Self::default()
    }
}

/// Current data the unlock recomputation reads.
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub current_path: &'a str,
    pub active_session: Option<&'a str>,
    pub selected_session: Option<&'a str>,
    pub known_sessions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Interactive,
    Locked,
}

/// Two-state gate: `Interactive` or `Locked` while a request is in flight.
#[derive(Debug)]
pub struct LoadingGate {
    state: GateState,
}

impl Default for LoadingGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Interactive,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == GateState::Locked
    }

    /// Enter `Locked`: all controls become non-operable.
    pub fn lock(&mut self) -> ControlState {
        self.state = GateState::Locked;
        ControlState::locked()
    }

    /// Leave `Locked` and recompute enablement from `ctx`.
    pub fn unlock(&mut self, ctx: &GateContext<'_>) -> ControlState {
        self.state = GateState::Interactive;
        Self::recompute(ctx)
    }

    /// Enablement for the current state; recomputed, never cached.
    pub fn controls(&self, ctx: &GateContext<'_>) -> ControlState {
        match self.state {
            GateState::Locked => ControlState::locked(),
            GateState::Interactive => Self::recompute(ctx),
        }
    }

    fn recompute(ctx: &GateContext<'_>) -> ControlState {
        let has_path = !ctx.current_path.is_empty();
        let has_selection = ctx.selected_session.is_some();
        ControlState {
            analyze: true,
            refresh: has_path,
            navigate_up: has_path && !paths::is_navigable_root(ctx.current_path),
            path_input: true,
            activate_session: true,
            session_selector: ctx.known_sessions > 0,
            load_selected: has_selection,
            delete_selected: has_selection,
            clear_session: ctx.active_session.is_some(),
        }
    }
}
