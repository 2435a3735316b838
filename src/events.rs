//! Button input events and the bounded input queue.
//!
//! Events are produced by:
//! - the debounced [`ButtonSampler`](crate::drivers::button::ButtonSampler)
//!   (edge detection over a raw pin),
//! - a host script or test harness pushing edges directly.
//!
//! They are consumed by the main loop, which feeds them one at a time
//! into [`AppController::handle_input`](crate::app::controller::AppController::handle_input).
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ ButtonSampler │────▶│              │     │               │
//! │ Host script   │────▶│  EventQueue  │────▶│ AppController │
//! │ Test harness  │────▶│  (bounded)   │     │  (consumer)   │
//! └───────────────┘     └──────────────┘     └───────────────┘
//! ```

use heapless::Deque;
use serde::{Deserialize, Serialize};

/// Maximum number of pending input events.
const EVENT_QUEUE_CAP: usize = 32;

/// Logical buttons on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    Left,
    Action,
    Right,
}

impl ButtonId {
    pub const ALL: [ButtonId; 3] = [ButtonId::Left, ButtonId::Action, ButtonId::Right];

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Action => "action",
            Self::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" | "l" => Some(Self::Left),
            "action" | "enter" | "a" => Some(Self::Action),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A discrete edge reported by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Button went down.
    ButtonDown(ButtonId),
    /// Button released after being held for the given number of milliseconds.
    ButtonUp(ButtonId, u32),
}

/// Hold-duration classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressKind {
    Short,
    Long,
}

impl PressKind {
    /// `held_ms < threshold_ms` is short, anything else long.
    pub fn classify(held_ms: u32, threshold_ms: u32) -> Self {
        if held_ms < threshold_ms {
            Self::Short
        } else {
            Self::Long
        }
    }
}

/// A completed press, as routed to the mode handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Press {
    pub button: ButtonId,
    pub kind: PressKind,
    pub held_ms: u32,
}

impl Press {
    pub fn new(button: ButtonId, held_ms: u32, long_press_ms: u32) -> Self {
        Self {
            button,
            kind: PressKind::classify(held_ms, long_press_ms),
            held_ms,
        }
    }

    pub fn is_long(&self) -> bool {
        self.kind == PressKind::Long
    }
}

// ── Bounded FIFO ──────────────────────────────────────────────

/// Fixed-capacity FIFO of pending input edges.  Owned by the main loop.
pub struct EventQueue {
    inner: Deque<InputEvent, EVENT_QUEUE_CAP>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Deque::new(),
        }
    }

    /// Push an event into the queue.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: InputEvent) -> bool {
        if self.inner.push_back(event).is_err() {
            log::warn!("input queue full, dropping {:?}", event);
            return false;
        }
        true
    }

    /// Pop the oldest pending event.
    pub fn pop(&mut self) -> Option<InputEvent> {
        self.inner.pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&mut self, mut handler: impl FnMut(InputEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
