//! Hold gestures built from raw button edges.
//!
//! [`HoldTracker`] remembers when each button went down so the controller
//! can react to holds *while they are still in progress*:
//!
//! - **chord**: all three buttons held together (toggles test mode);
//! - **solo hold**: exactly one button held past a threshold (test-mode
//!   shortcuts in the main view and the shop).
//!
//! Each gesture fires once per hold.  Buttons that took part in a fired
//! gesture are marked consumed, and their release must not reach the
//! mode handlers as an ordinary press.

use crate::events::ButtonId;

const BUTTONS: usize = ButtonId::ALL.len();

fn slot(button: ButtonId) -> usize {
    match button {
        ButtonId::Left => 0,
        ButtonId::Action => 1,
        ButtonId::Right => 2,
    }
}

#[derive(Debug, Default, Clone)]
pub struct HoldTracker {
    down_at: [Option<u64>; BUTTONS],
    consumed: [bool; BUTTONS],
    chord_fired: bool,
    /// When the current single-button hold began.  Cleared once it fires.
    solo_since: Option<u64>,
}

impl HoldTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_down(&mut self, button: ButtonId, now: u64) {
        let i = slot(button);
        if self.down_at[i].is_none() {
            self.down_at[i] = Some(now);
        }
        self.restart_solo(now);
    }

    /// Forget the hold.  Returns `true` when the release belongs to a
    /// gesture that already fired and must be swallowed.
    pub fn on_up(&mut self, button: ButtonId, now: u64) -> bool {
        let i = slot(button);
        self.down_at[i] = None;
        self.chord_fired = false;
        self.restart_solo(now);
        core::mem::take(&mut self.consumed[i])
    }

    fn restart_solo(&mut self, now: u64) {
        self.solo_since = (self.held_count() == 1).then_some(now);
    }

    pub fn held_count(&self) -> usize {
        self.down_at.iter().filter(|d| d.is_some()).count()
    }

    /// All buttons down together for at least `hold_ms`, measured from the
    /// last one to go down.  Reported once per chord.
    pub fn chord(&mut self, now: u64, hold_ms: u32) -> bool {
        if self.chord_fired || self.held_count() != BUTTONS {
            return false;
        }
        let since = self.down_at.iter().flatten().copied().max().unwrap_or(now);
        if now.saturating_sub(since) < u64::from(hold_ms) {
            return false;
        }
        self.chord_fired = true;
        self.consumed = [true; BUTTONS];
        true
    }

    /// Exactly one of `eligible` down, alone, for at least `hold_ms`.
    /// Reported once per hold.  Other buttons are left untouched.
    pub fn solo(&mut self, now: u64, hold_ms: u32, eligible: &[ButtonId]) -> Option<ButtonId> {
        let since = self.solo_since?;
        if now.saturating_sub(since) < u64::from(hold_ms) {
            return None;
        }
        let button = eligible
            .iter()
            .copied()
            .find(|b| self.down_at[slot(*b)].is_some())?;
        self.solo_since = None;
        self.consumed[slot(button)] = true;
        Some(button)
    }
}
