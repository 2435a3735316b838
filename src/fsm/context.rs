//! Shared mutable context threaded through every mode handler.
//!
//! `AppContext` is the blackboard the handlers read from and write to: the
//! current time, configuration, the pet, the three game engines, menu
//! cursors and an outbox of audio cues and events that the controller
//! flushes to its ports after each step.  Nothing in here touches a port
//! except [`AppContext::persist`].

use heapless::Vec;
use log::{debug, warn};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::app::events::{AppEvent, AudioCue};
use crate::app::ports::StoragePort;
use crate::config::PetConfig;
use crate::games::dodge::DodgeGame;
use crate::games::memory::MemoryGame;
use crate::games::tictactoe::TicTacToeGame;
use crate::games::{GameKind, GameSummary};
use crate::pet::PetModel;
use crate::pet::shop::{MAX_SHOP_ITEMS, ShopItem, shop_items};

const OUTBOX_CAP: usize = 16;

/// Main menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MainMenuItem {
    Feed,
    Shop,
    Games,
    Sleep,
}

impl MainMenuItem {
    pub const ALL: [MainMenuItem; 4] = [Self::Feed, Self::Shop, Self::Games, Self::Sleep];

    pub fn label(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Shop => "shop",
            Self::Games => "games",
            Self::Sleep => "sleep",
        }
    }
}

// ---------------------------------------------------------------------------
// Menu cursors
// ---------------------------------------------------------------------------

/// Selection index per menu.  Reset to 0 whenever the menu opens.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuCursors {
    pub main: usize,
    pub games: usize,
    pub shop: usize,
}

// ---------------------------------------------------------------------------
// Outbox (written by handlers; drained by the controller)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Outbox {
    pub cues: Vec<AudioCue, OUTBOX_CAP>,
    pub events: Vec<AppEvent, OUTBOX_CAP>,
}

// ---------------------------------------------------------------------------
// AppContext
// ---------------------------------------------------------------------------

pub struct AppContext {
    // -- Timing --
    /// Monotonic time of the step being processed.
    pub now: u64,
    /// When the current mode was entered.
    pub mode_entered_at: u64,
    /// Last menu input or menu-open time.
    pub menu_activity_at: u64,

    // -- Configuration --
    pub config: PetConfig,
    /// Debug shortcuts enabled.  Starts from the config, toggled at runtime.
    pub test_mode: bool,

    // -- Domain --
    pub pet: PetModel,
    pub dodge: DodgeGame,
    pub memory: MemoryGame,
    pub tictactoe: TicTacToeGame,
    pub rng: Pcg32,

    // -- UI state --
    pub menus: MenuCursors,
    /// The game being played or just finished.
    pub active_game: GameKind,
    /// Payout of the most recent finished game.
    pub last_game: Option<GameSummary>,

    // -- Side effects --
    pub outbox: Outbox,
    /// Game whose records still have to be written to storage.
    pub pending_finish: Option<GameKind>,
}

impl AppContext {
    /// Fresh context with a brand-new pet and a seeded RNG.
    pub fn new(config: PetConfig, seed: u64) -> Self {
        Self {
            now: 0,
            mode_entered_at: 0,
            menu_activity_at: 0,
            pet: PetModel::new(&config),
            dodge: DodgeGame::new(),
            memory: MemoryGame::new(config.dash_threshold_ms),
            tictactoe: TicTacToeGame::new(config.pet_move_delay_ms, config.block_chance_percent),
            rng: Pcg32::seed_from_u64(seed),
            menus: MenuCursors::default(),
            active_game: GameKind::Dodge,
            last_game: None,
            outbox: Outbox::default(),
            pending_finish: None,
            test_mode: config.test_mode,
            config,
        }
    }

    /// Replace the pet and game records with what storage holds.
    pub fn load(&mut self, store: &impl StoragePort) {
        self.pet = PetModel::load(store, &self.config);
        self.dodge.load_record(store);
        self.memory.load_high_score(store);
        self.tictactoe.load_stats(store);
    }

    pub fn cue(&mut self, cue: AudioCue) {
        if self.outbox.cues.push(cue).is_err() {
            debug!("cue outbox full, dropping {:?}", cue);
        }
    }

    pub fn event(&mut self, event: AppEvent) {
        if self.outbox.events.push(event).is_err() {
            warn!("event outbox full, dropping {:?}", event);
        }
    }

    /// Games listed in the game menu: dodge always, the rest once bought.
    pub fn game_menu_items(&self) -> Vec<GameKind, 3> {
        let unlocked = [
            (GameKind::Dodge, true),
            (GameKind::Memory, self.pet.memory_unlocked()),
            (GameKind::TicTacToe, self.pet.tictactoe_unlocked()),
        ];
        unlocked
            .into_iter()
            .filter_map(|(kind, open)| open.then_some(kind))
            .collect()
    }

    pub fn shop_menu_items(&self) -> Vec<ShopItem, MAX_SHOP_ITEMS> {
        shop_items(self.pet.memory_unlocked(), self.pet.tictactoe_unlocked())
    }

    /// Flush everything the step changed: game records first, then the pet.
    /// Storage failures are logged and otherwise ignored.
    pub fn persist(&mut self, store: &mut impl StoragePort) {
        if let Some(kind) = self.pending_finish.take() {
            let improved = match kind {
                GameKind::Dodge => self.dodge.finish(store),
                GameKind::Memory => self.memory.finish(store),
                GameKind::TicTacToe => self.tictactoe.finish(store),
            };
            debug!("{} records flushed (changed: {})", kind.name(), improved);
        }
        if let Err(e) = self.pet.save(store) {
            warn!("pet save failed: {}", e);
        }
    }
}
