//! Debounced button driver over an `embedded-hal` input pin.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up: a low level means pressed.
//! [`ButtonSampler::poll`] is called from the main loop; it runs the
//! debounce state machine and reports clean edges as [`InputEvent`]s.
//!
//! ## Edges
//!
//! | Edge    | Condition                                 | Event                  |
//! |---------|-------------------------------------------|------------------------|
//! | Down    | Pin low and stable for `DEBOUNCE_MS`      | `ButtonDown(id)`       |
//! | Up      | Pin high and stable for `DEBOUNCE_MS`     | `ButtonUp(id, held)`   |
//!
//! `held` is measured between the two debounced edges, so short/long
//! classification happens downstream against the configured threshold.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::events::{ButtonId, InputEvent};

const DEBOUNCE_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    Released,
    DebounceDown { since_ms: u64 },
    Pressed { since_ms: u64 },
    DebounceUp { pressed_at: u64, since_ms: u64 },
}

pub struct ButtonSampler<P> {
    id: ButtonId,
    pin: P,
    state: EdgeState,
}

impl<P: InputPin> ButtonSampler<P> {
    pub fn new(id: ButtonId, pin: P) -> Self {
        Self {
            id,
            pin,
            state: EdgeState::Released,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Sample the pin once.  Returns a debounced edge, if any.
    pub fn poll(&mut self, now_ms: u64) -> Option<InputEvent> {
        let low = match self.pin.is_low() {
            Ok(level) => level,
            Err(_) => {
                warn!("{} button: pin read failed", self.id.name());
                return None;
            }
        };

        match self.state {
            EdgeState::Released => {
                if low {
                    self.state = EdgeState::DebounceDown { since_ms: now_ms };
                }
                None
            }

            EdgeState::DebounceDown { since_ms } => {
                if !low {
                    self.state = EdgeState::Released;
                    return None;
                }
                if now_ms.saturating_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = EdgeState::Pressed { since_ms };
                    return Some(InputEvent::ButtonDown(self.id));
                }
                None
            }

            EdgeState::Pressed { since_ms } => {
                if !low {
                    self.state = EdgeState::DebounceUp {
                        pressed_at: since_ms,
                        since_ms: now_ms,
                    };
                }
                None
            }

            EdgeState::DebounceUp {
                pressed_at,
                since_ms,
            } => {
                if low {
                    // Bounce: still held.
                    self.state = EdgeState::Pressed {
                        since_ms: pressed_at,
                    };
                    return None;
                }
                if now_ms.saturating_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = EdgeState::Released;
                    let held = since_ms.saturating_sub(pressed_at);
                    let held = u32::try_from(held).unwrap_or(u32::MAX);
                    return Some(InputEvent::ButtonUp(self.id, held));
                }
                None
            }
        }
    }

    /// True between the debounced down edge and the debounced up edge.
    pub fn is_held(&self) -> bool {
        matches!(
            self.state,
            EdgeState::Pressed { .. } | EdgeState::DebounceUp { .. }
        )
    }
}
