//! Secret admin trigger.
//!
//! Admin mode is unlocked by a hidden gesture: several quick taps on the
//! same element, or one long press. [`AdminTrigger`] is the debounce state
//! machine behind it; callers feed it timestamps and act on `Triggered`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Gesture thresholds, as written in `safari.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminTriggerConfig {
    /// Taps needed to trigger.
    pub taps: u32,
    /// All taps must land within this window.
    pub window_ms: u64,
    /// Minimum hold time for a long press.
    pub hold_ms: u64,
}

impl Default for AdminTriggerConfig {
    fn default() -> Self {
        Self {
            taps: 3,
            window_ms: 1_000,
            hold_ms: 2_000,
        }
    }
}

/// Result of feeding an input event to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Not (yet) a trigger.
    Pending,
    /// The gesture completed; the trigger has reset itself.
    Triggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Tapping { first: Instant, count: u32 },
    Pressed { since: Instant },
}

/// Tap-count and long-press state machine.
#[derive(Debug, Clone)]
pub struct AdminTrigger {
    taps: u32,
    window: Duration,
    hold: Duration,
    state: State,
}

impl AdminTrigger {
    pub fn new(config: &AdminTriggerConfig) -> Self {
        Self {
            taps: config.taps.max(1),
            window: Duration::from_millis(config.window_ms),
            hold: Duration::from_millis(config.hold_ms),
            state: State::Idle,
        }
    }

    /// Register a tap at `now`.
    pub fn tap(&mut self, now: Instant) -> Gesture {
        let count = match self.state {
            State::Tapping { first, count } if now.saturating_duration_since(first) <= self.window => {
                count + 1
            }
            _ => {
                self.state = State::Tapping { first: now, count: 1 };
                1
            }
        };

        if count >= self.taps {
            self.state = State::Idle;
            return Gesture::Triggered;
        }

        if let State::Tapping { first, .. } = self.state {
            self.state = State::Tapping { first, count };
        }
        Gesture::Pending
    }

    /// A press started at `now`.
    pub fn press(&mut self, now: Instant) {
        self.state = State::Pressed { since: now };
    }

    /// The press was released at `now`.
    pub fn release(&mut self, now: Instant) -> Gesture {
        let State::Pressed { since } = self.state else {
            return Gesture::Pending;
        };
        self.state = State::Idle;

        if now.saturating_duration_since(since) >= self.hold {
            Gesture::Triggered
        } else {
            Gesture::Pending
        }
    }

    /// Forget any partial gesture.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }
}

impl Default for AdminTrigger {
    fn default() -> Self {
        Self::new(&AdminTriggerConfig::default())
    }
}
