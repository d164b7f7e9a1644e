//! Open/closed state machine
//!
//! Two states and three events. Every transition is listed in
//! [`TRANSITIONS`]; the notifications a transition emits are derived from the
//! event and the resulting state.

use smallvec::{smallvec, SmallVec};

pub const OPEN: &str = "open";
pub const CLOSE: &str = "close";
pub const TOGGLE: &str = "toggle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FabState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FabEvent {
    Open,
    Close,
    Toggle,
}

/// A transition in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: FabState,
    pub event: FabEvent,
    pub to: FabState,
}

const fn transition(from: FabState, event: FabEvent, to: FabState) -> Transition {
    Transition { from, event, to }
}

pub const TRANSITIONS: [Transition; 6] = [
    transition(FabState::Closed, FabEvent::Open, FabState::Open),
    transition(FabState::Open, FabEvent::Open, FabState::Open),
    transition(FabState::Open, FabEvent::Close, FabState::Closed),
    transition(FabState::Closed, FabEvent::Close, FabState::Closed),
    transition(FabState::Closed, FabEvent::Toggle, FabState::Open),
    transition(FabState::Open, FabEvent::Toggle, FabState::Closed),
];

impl FabState {
    pub fn from_opened(opened: bool) -> Self {
        if opened {
            FabState::Open
        } else {
            FabState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == FabState::Open
    }

    /// Next state for `event`
    pub fn on(self, event: FabEvent) -> FabState {
        TRANSITIONS
            .iter()
            .find(|t| t.from == self && t.event == event)
            .map_or(self, |t| t.to)
    }
}

impl FabEvent {
    /// Notifications to dispatch after moving to `next`, in order
    pub fn notifications(self, next: FabState) -> SmallVec<[&'static str; 2]> {
        match self {
            FabEvent::Open => smallvec![OPEN],
            FabEvent::Close => smallvec![CLOSE],
            FabEvent::Toggle => {
                let implied = if next.is_open() { OPEN } else { CLOSE };
                smallvec![implied, TOGGLE]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total() {
        for from in [FabState::Closed, FabState::Open] {
            for event in [FabEvent::Open, FabEvent::Close, FabEvent::Toggle] {
                let matches = TRANSITIONS
                    .iter()
                    .filter(|t| t.from == from && t.event == event)
                    .count();
                assert_eq!(matches, 1, "{from:?} + {event:?}");
            }
        }
    }

    #[test]
    fn test_toggle_flips() {
        assert_eq!(FabState::Closed.on(FabEvent::Toggle), FabState::Open);
        assert_eq!(FabState::Open.on(FabEvent::Toggle), FabState::Closed);
        assert_eq!(FabState::Open.on(FabEvent::Open), FabState::Open);
    }

    #[test]
    fn test_notifications() {
        assert_eq!(FabEvent::Toggle.notifications(FabState::Open).as_slice(), &[OPEN, TOGGLE]);
        assert_eq!(FabEvent::Toggle.notifications(FabState::Closed).as_slice(), &[CLOSE, TOGGLE]);
        assert_eq!(FabEvent::Close.notifications(FabState::Closed).as_slice(), &[CLOSE]);
    }
}
