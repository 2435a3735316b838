//! Read-only view of the engine for renderers, logs and the host simulator.
//!
//! A [`Snapshot`] is captured on demand; it owns its data and serialises
//! with serde, so a renderer never holds a borrow on the controller.

use heapless::Vec;
use serde::Serialize;

use crate::fsm::ModeId;
use crate::fsm::context::{AppContext, MainMenuItem};
use crate::games::dodge::{MAX_OBSTACLES, Obstacle};
use crate::games::memory::{MAX_SEQUENCE, MemoryState, Symbol};
use crate::games::tictactoe::{Board, GameResult, TicTacToeState};
use crate::games::{GameKind, GameSummary};
use crate::pet::mood::Mood;
use crate::pet::shop::MAX_SHOP_ITEMS;

pub use crate::pet::Overlay;

/// The mode as the user sees it: overlays replace whatever is underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    MainView,
    MainMenu,
    GameMenu,
    ShopMenu,
    InGame(GameKind),
    GameResult(GameKind),
    Sleeping,
    InsufficientCoinsOverlay,
    HappyOverlay,
    AngryOverlay,
}

impl Mode {
    /// Combine the FSM mode, the game in play and any active overlay.
    pub fn resolve(id: ModeId, game: GameKind, overlay: Option<Overlay>) -> Self {
        if let Some(o) = overlay {
            return match o {
                Overlay::Angry => Self::AngryOverlay,
                Overlay::Happy => Self::HappyOverlay,
                Overlay::InsufficientCoins => Self::InsufficientCoinsOverlay,
            };
        }
        match id {
            ModeId::MainView => Self::MainView,
            ModeId::MainMenu => Self::MainMenu,
            ModeId::GameMenu => Self::GameMenu,
            ModeId::ShopMenu => Self::ShopMenu,
            ModeId::Dodge => Self::InGame(GameKind::Dodge),
            ModeId::Memory => Self::InGame(GameKind::Memory),
            ModeId::TicTacToe => Self::InGame(GameKind::TicTacToe),
            ModeId::GameResult => Self::GameResult(game),
            ModeId::Sleeping => Self::Sleeping,
        }
    }

    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            Self::InsufficientCoinsOverlay | Self::HappyOverlay | Self::AngryOverlay
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub items: Vec<&'static str, MAX_SHOP_ITEMS>,
    pub selected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub enum GameView {
    Dodge {
        player_lane: u8,
        level: u32,
        score: u32,
        record: u32,
        obstacles: [Obstacle; MAX_OBSTACLES],
    },
    Memory {
        state: MemoryState,
        level: u32,
        high_score: u32,
        sequence: Vec<Symbol, MAX_SEQUENCE>,
        input_index: usize,
        lit: Option<Symbol>,
    },
    TicTacToe {
        state: TicTacToeState,
        result: GameResult,
        board: Board,
        cursor: (usize, usize),
        wins: u32,
        draws: u32,
        losses: u32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub now_ms: u64,
    pub mode: Mode,
    /// The FSM mode underneath any overlay.
    pub base_mode: ModeId,
    pub mood: Mood,
    pub hunger: u8,
    pub boredom: u8,
    pub sleepiness: u8,
    pub coins: u32,
    pub sleeping: bool,
    pub test_mode: bool,
    pub memory_unlocked: bool,
    pub tictactoe_unlocked: bool,
    pub overlay: Option<Overlay>,
    pub menu: Option<MenuView>,
    pub game: Option<GameView>,
    pub last_game: Option<GameSummary>,
}

impl Snapshot {
    pub(crate) fn capture(ctx: &AppContext, id: ModeId) -> Self {
        let now = ctx.now;
        let pet = &ctx.pet;
        let overlay = pet.overlay(now);
        Self {
            now_ms: now,
            mode: Mode::resolve(id, ctx.active_game, overlay),
            base_mode: id,
            mood: pet.mood(now),
            hunger: pet.hunger(),
            boredom: pet.boredom(),
            sleepiness: pet.sleepiness(),
            coins: pet.coins(),
            sleeping: pet.is_sleeping(),
            test_mode: ctx.test_mode,
            memory_unlocked: pet.memory_unlocked(),
            tictactoe_unlocked: pet.tictactoe_unlocked(),
            overlay,
            menu: menu_view(ctx, id),
            game: game_view(ctx, id),
            last_game: ctx.last_game,
        }
    }
}

fn menu_view(ctx: &AppContext, id: ModeId) -> Option<MenuView> {
    // Every listing fits: the shop is the longest menu.
    let (items, selected) = match id {
        ModeId::MainMenu => (
            MainMenuItem::ALL.iter().map(|i| i.label()).collect(),
            ctx.menus.main,
        ),
        ModeId::GameMenu => (
            ctx.game_menu_items().iter().map(|k| k.name()).collect(),
            ctx.menus.games,
        ),
        ModeId::ShopMenu => (
            ctx.shop_menu_items().iter().map(|i| i.label()).collect(),
            ctx.menus.shop,
        ),
        _ => return None,
    };
    Some(MenuView { items, selected })
}

fn game_view(ctx: &AppContext, id: ModeId) -> Option<GameView> {
    let kind = match id {
        ModeId::Dodge => GameKind::Dodge,
        ModeId::Memory => GameKind::Memory,
        ModeId::TicTacToe => GameKind::TicTacToe,
        ModeId::GameResult => ctx.active_game,
        _ => return None,
    };
    Some(match kind {
        GameKind::Dodge => {
            let g = &ctx.dodge;
            GameView::Dodge {
                player_lane: g.player_lane(),
                level: g.level(),
                score: g.score(),
                record: g.record(),
                obstacles: *g.obstacles(),
            }
        }
        GameKind::Memory => {
            let g = &ctx.memory;
            GameView::Memory {
                state: g.state(),
                level: g.level(),
                high_score: g.high_score(),
                sequence: Vec::from_slice(g.sequence()).unwrap_or_default(),
                input_index: g.input_index(),
                lit: g.lit_symbol(),
            }
        }
        GameKind::TicTacToe => {
            let g = &ctx.tictactoe;
            GameView::TicTacToe {
                state: g.state(),
                result: g.result(),
                board: *g.board(),
                cursor: g.cursor(),
                wins: g.wins(),
                draws: g.draws(),
                losses: g.losses(),
            }
        }
    })
}
