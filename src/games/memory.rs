//! Morse memory game: the pet blinks a dot/dash sequence, the player taps
//! it back.  Each cleared round appends one more symbol.
//!
//! ```text
//!  Idle ──start──▶ ShowingSequence ──(all shown)──▶ WaitingInput
//!                        ▲                              │
//!                        └───────(round cleared)────────┤
//!                                                       ▼
//!                          (wrong symbol / timeout)  GameOver
//! ```
//!
//! Showing is non-blocking: [`MemoryGame::update`] walks a small
//! lit/gap timeline and hands back the symbol whose cue should play.

use heapless::Vec;
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::app::ports::StoragePort;
use crate::pet::NAMESPACE;

pub const MAX_SEQUENCE: usize = 20;

pub const DOT_MS: u64 = 200;
pub const DASH_MS: u64 = 600;
pub const GAP_MS: u64 = 300;

const BASE_TIMEOUT_MS: u64 = 3_000;
const TIMEOUT_STEP_MS: u64 = 200;
const MIN_TIMEOUT_MS: u64 = 1_000;

const KEY_HIGH_SCORE: &str = "memHighScore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// Short holds are dots.
    pub fn from_hold(held_ms: u32, dash_threshold_ms: u32) -> Self {
        if held_ms < dash_threshold_ms {
            Self::Dot
        } else {
            Self::Dash
        }
    }

    /// How long the symbol stays lit while the sequence is shown.
    pub fn display_ms(self) -> u64 {
        match self {
            Self::Dot => DOT_MS,
            Self::Dash => DASH_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemoryState {
    Idle,
    ShowingSequence,
    WaitingInput,
    GameOver,
}

/// What a released press did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not accepting input right now.
    Ignored,
    /// Right symbol, more to go.
    Correct,
    /// Right symbol, round cleared.
    RoundComplete,
    /// Wrong symbol, game over.
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShowPhase {
    Lit,
    Gap,
}

/// Input timeout while waiting: 3 s, 200 ms shorter per level, never
/// under 1 s.
pub fn input_timeout_ms(level: u32) -> u64 {
    BASE_TIMEOUT_MS
        .saturating_sub(TIMEOUT_STEP_MS.saturating_mul(u64::from(level)))
        .max(MIN_TIMEOUT_MS)
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    sequence: Vec<Symbol, MAX_SEQUENCE>,
    state: MemoryState,
    level: u32,
    high_score: u32,
    stored_high_score: u32,
    input_index: usize,

    show_index: usize,
    show_phase: ShowPhase,
    phase_started_at: u64,
    cue_pending: bool,

    last_input_at: u64,
    press_held: bool,
    dash_threshold_ms: u32,
}

impl MemoryGame {
    pub fn new(dash_threshold_ms: u32) -> Self {
        Self {
            sequence: Vec::new(),
            state: MemoryState::Idle,
            level: 0,
            high_score: 0,
            stored_high_score: 0,
            input_index: 0,
            show_index: 0,
            show_phase: ShowPhase::Lit,
            phase_started_at: 0,
            cue_pending: false,
            last_input_at: 0,
            press_held: false,
            dash_threshold_ms,
        }
    }

    pub fn load_high_score(&mut self, store: &impl StoragePort) {
        let stored = u32::try_from(store.get_int(NAMESPACE, KEY_HIGH_SCORE, 0)).unwrap_or(0);
        self.high_score = stored;
        self.stored_high_score = stored;
    }

    pub fn start(&mut self, now: u64, rng: &mut impl Rng) {
        self.sequence.clear();
        self.level = 0;
        self.input_index = 0;
        self.press_held = false;
        self.append_symbol(rng);
        self.begin_showing(now);
        info!("memory: started");
    }

    /// Advance the show timeline or the input timeout.  Returns the symbol
    /// whose cue should start now, if any.
    pub fn update(&mut self, now: u64) -> Option<Symbol> {
        match self.state {
            MemoryState::ShowingSequence => self.advance_show(now),
            MemoryState::WaitingInput => {
                if !self.press_held
                    && now.saturating_sub(self.last_input_at) >= input_timeout_ms(self.level)
                {
                    info!("memory: input timeout at level {}", self.level);
                    self.state = MemoryState::GameOver;
                }
                None
            }
            MemoryState::Idle | MemoryState::GameOver => None,
        }
    }

    fn advance_show(&mut self, now: u64) -> Option<Symbol> {
        let mut cue = None;
        if self.cue_pending {
            self.cue_pending = false;
            cue = self.sequence.get(self.show_index).copied();
        }
        loop {
            let elapsed = now.saturating_sub(self.phase_started_at);
            match self.show_phase {
                ShowPhase::Lit => {
                    let Some(sym) = self.sequence.get(self.show_index) else {
                        break;
                    };
                    let lit_ms = sym.display_ms();
                    if elapsed < lit_ms {
                        break;
                    }
                    self.phase_started_at += lit_ms;
                    self.show_phase = ShowPhase::Gap;
                }
                ShowPhase::Gap => {
                    if elapsed < GAP_MS {
                        break;
                    }
                    self.phase_started_at += GAP_MS;
                    self.show_index += 1;
                    if self.show_index >= self.sequence.len() {
                        self.state = MemoryState::WaitingInput;
                        self.input_index = 0;
                        self.last_input_at = now;
                        debug!("memory: waiting for {} symbols", self.sequence.len());
                        break;
                    }
                    self.show_phase = ShowPhase::Lit;
                    cue = self.sequence.get(self.show_index).copied();
                }
            }
        }
        cue
    }

    fn begin_showing(&mut self, now: u64) {
        self.state = MemoryState::ShowingSequence;
        self.show_index = 0;
        self.show_phase = ShowPhase::Lit;
        self.phase_started_at = now;
        self.cue_pending = true;
    }

    fn append_symbol(&mut self, rng: &mut impl Rng) -> bool {
        let sym = if rng.random_bool(0.5) {
            Symbol::Dot
        } else {
            Symbol::Dash
        };
        self.sequence.push(sym).is_ok()
    }

    /// A button went down.  Holds pause the input timeout.
    pub fn press_started(&mut self, now: u64) {
        if self.state != MemoryState::WaitingInput {
            debug!("memory: press ignored in {:?}", self.state);
            return;
        }
        self.press_held = true;
        self.last_input_at = now;
    }

    /// A button came up after `held_ms`.  Only presses that started while
    /// waiting for input count; one begun during the show is dropped.
    pub fn press_released(&mut self, held_ms: u32, now: u64, rng: &mut impl Rng) -> InputOutcome {
        if self.state != MemoryState::WaitingInput {
            debug!("memory: release ignored in {:?}", self.state);
            return InputOutcome::Ignored;
        }
        if !core::mem::take(&mut self.press_held) {
            debug!("memory: release of a press that began during the show, ignored");
            self.last_input_at = now;
            return InputOutcome::Ignored;
        }
        self.last_input_at = now;

        let got = Symbol::from_hold(held_ms, self.dash_threshold_ms);
        let Some(&expected) = self.sequence.get(self.input_index) else {
            self.state = MemoryState::GameOver;
            return InputOutcome::Wrong;
        };
        if got != expected {
            info!(
                "memory: wrong symbol {:?} (wanted {:?}) at {}/{}",
                got,
                expected,
                self.input_index,
                self.sequence.len()
            );
            self.state = MemoryState::GameOver;
            return InputOutcome::Wrong;
        }

        self.input_index += 1;
        if self.input_index < self.sequence.len() {
            return InputOutcome::Correct;
        }

        self.level += 1;
        self.high_score = self.high_score.max(self.level);
        info!("memory: round cleared, level {}", self.level);
        if self.append_symbol(rng) {
            self.begin_showing(now);
        } else {
            info!("memory: full sequence mastered");
            self.state = MemoryState::GameOver;
        }
        InputOutcome::RoundComplete
    }

    /// Persist the high score if this run beat the stored one.
    pub fn finish(&mut self, store: &mut impl StoragePort) -> bool {
        if self.high_score <= self.stored_high_score {
            return false;
        }
        let value = i32::try_from(self.high_score).unwrap_or(i32::MAX);
        if let Err(e) = store.put_int(NAMESPACE, KEY_HIGH_SCORE, value) {
            warn!("memory: failed to persist high score: {}", e);
            return false;
        }
        self.stored_high_score = self.high_score;
        true
    }

    pub fn is_over(&self) -> bool {
        self.state == MemoryState::GameOver
    }

    pub fn state(&self) -> MemoryState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn input_index(&self) -> usize {
        self.input_index
    }

    /// The symbol currently lit during the show, if any.
    pub fn lit_symbol(&self) -> Option<Symbol> {
        if self.state == MemoryState::ShowingSequence && self.show_phase == ShowPhase::Lit {
            self.sequence.get(self.show_index).copied()
        } else {
            None
        }
    }
}
