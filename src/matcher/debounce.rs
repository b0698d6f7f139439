use std::time::{Duration, Instant};

/// Per reference pose streak tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    /// No below-threshold streak in progress
    #[default]
    Idle,
    /// Below threshold continuously since `since`
    Pending { since: Instant },
}

impl DebounceState {
    /// Feed one tick. Returns true when the match should fire.
    ///
    /// A streak fires once `now - since > timeout` (strict) and then returns
    /// to `Idle`, so holding the pose fires at most once per streak. A zero
    /// timeout fires on the first below-threshold tick.
    pub fn step(&mut self, below_threshold: bool, timeout: Duration, now: Instant) -> bool {
        if !below_threshold {
            *self = DebounceState::Idle;
            return false;
        }

        match *self {
            DebounceState::Idle if timeout.is_zero() => true,
            DebounceState::Idle => {
                *self = DebounceState::Pending { since: now };
                false
            }
            DebounceState::Pending { since } => {
                if now.saturating_duration_since(since) > timeout {
                    *self = DebounceState::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DebounceState::Pending { .. })
    }
}
