//! Function-pointer finite state machine for the application modes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ModeTable                                                           │
//! │  ┌───────────┬──────────┬─────────┬───────────┬──────────┬────────┐  │
//! │  │ ModeId    │ on_enter │ on_exit │ on_update │ on_press │ on_down│  │
//! │  ├───────────┼──────────┼─────────┼───────────┼──────────┼────────┤  │
//! │  │ MainView  │ fn(ctx)  │ fn(ctx) │ fn(ctx)→? │ fn(c,p)→?│ fn(ctx)│  │
//! │  │ MainMenu  │   ...    │   ...   │    ...    │   ...    │  ...   │  │
//! │  │ ...       │          │         │           │          │        │  │
//! │  └───────────┴──────────┴─────────┴───────────┴──────────┴────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each poll the engine calls `on_update` for the **current** mode; each
//! completed press is routed to `on_press`.  Either may return
//! `Some(next_id)`, in which case the engine runs `on_exit` for the current
//! mode, then `on_enter` for the next.  All handlers receive
//! `&mut AppContext`, which holds the pet, the game engines, menu cursors
//! and the outbox of cues and events.

pub mod context;
pub mod states;

use context::AppContext;
use log::info;
use serde::{Deserialize, Serialize};

use crate::events::Press;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Every mode the controller can be in.  Overlays are not modes; they are
/// derived from the pet's timed flags and layered on top.
/// Must stay in sync with [`states::build_mode_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModeId {
    MainView = 0,
    MainMenu = 1,
    GameMenu = 2,
    ShopMenu = 3,
    Dodge = 4,
    Memory = 5,
    TicTacToe = 6,
    GameResult = 7,
    Sleeping = 8,
}

impl ModeId {
    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = 9;

    /// Convert an index back to a `ModeId`.  Out-of-range falls back to
    /// `MainView`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::MainView,
            1 => Self::MainMenu,
            2 => Self::GameMenu,
            3 => Self::ShopMenu,
            4 => Self::Dodge,
            5 => Self::Memory,
            6 => Self::TicTacToe,
            7 => Self::GameResult,
            8 => Self::Sleeping,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::MainView
            }
        }
    }

    pub fn is_menu(self) -> bool {
        matches!(self, Self::MainMenu | Self::GameMenu | Self::ShopMenu)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit` / `on_down` actions.
pub type ModeActionFn = fn(&mut AppContext);

/// Per-poll update.  Returns `Some(next)` to trigger a transition.
pub type ModeUpdateFn = fn(&mut AppContext) -> Option<ModeId>;

/// Completed-press handler.  Returns `Some(next)` to trigger a transition.
pub type ModePressFn = fn(&mut AppContext, Press) -> Option<ModeId>;

// ---------------------------------------------------------------------------
// Mode descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single mode.
pub struct ModeDescriptor {
    pub id: ModeId,
    pub name: &'static str,
    pub on_enter: Option<ModeActionFn>,
    pub on_exit: Option<ModeActionFn>,
    pub on_update: ModeUpdateFn,
    pub on_press: ModePressFn,
    /// Button went down.  Only timers care; routing happens on release.
    pub on_down: Option<ModeActionFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `ModeId as usize`.
    table: [ModeDescriptor; ModeId::COUNT],
    current: usize,
    transitions: u64,
}

impl Fsm {
    pub fn new(table: [ModeDescriptor; ModeId::COUNT], initial: ModeId) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut AppContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        ctx.mode_entered_at = ctx.now;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Run the current mode's `on_update`, following any transition it asks
    /// for.
    pub fn tick(&mut self, ctx: &mut AppContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Route a completed press to the current mode.
    pub fn press(&mut self, press: Press, ctx: &mut AppContext) {
        let next = (self.table[self.current].on_press)(ctx, press);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Tell the current mode a button went down.
    pub fn button_down(&mut self, ctx: &mut AppContext) {
        if let Some(down) = self.table[self.current].on_down {
            down(ctx);
        }
    }

    /// Jump straight to `next`, running the exit/enter actions.
    pub fn force_transition(&mut self, next: ModeId, ctx: &mut AppContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_mode(&self) -> ModeId {
        ModeId::from_index(self.current)
    }

    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// Number of transitions taken since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    fn transition(&mut self, next_id: ModeId, ctx: &mut AppContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions += 1;
        ctx.mode_entered_at = ctx.now;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
