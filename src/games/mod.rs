//! Mini-game engines and their coin payouts.
//!
//! Each engine is a self-contained state machine driven by
//! `update(now, rng)` plus its own input methods.  None of them block:
//! every pause (symbol display, pet "thinking") is a timestamp compared on
//! the next update.

pub mod dodge;
pub mod memory;
pub mod tictactoe;

use serde::Serialize;

use tictactoe::GameResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameKind {
    Dodge,
    Memory,
    TicTacToe,
}

impl GameKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dodge => "dodge",
            Self::Memory => "memory",
            Self::TicTacToe => "tictactoe",
        }
    }
}

/// How a finished game went, as far as the payout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Level-based games report the level reached.
    Level(u32),
    /// Tic-tac-toe reports the board result.
    Board(GameResult),
}

/// Everything the result screen and event log need about a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub kind: GameKind,
    pub outcome: Outcome,
    pub coins: u32,
}

impl GameSummary {
    pub fn dodge(level: u32) -> Self {
        Self {
            kind: GameKind::Dodge,
            outcome: Outcome::Level(level),
            coins: dodge_reward(level),
        }
    }

    pub fn memory(level: u32) -> Self {
        Self {
            kind: GameKind::Memory,
            outcome: Outcome::Level(level),
            coins: memory_reward(level),
        }
    }

    pub fn tictactoe(result: GameResult) -> Self {
        Self {
            kind: GameKind::TicTacToe,
            outcome: Outcome::Board(result),
            coins: tictactoe_reward(result),
        }
    }
}

/// `1 + 2 + … + n`.
pub fn triangular(n: u32) -> u32 {
    n.saturating_mul(n.saturating_add(1)) / 2
}

/// Triangular number of the level plus a survival bonus of two per level
/// cleared.
pub fn dodge_reward(level: u32) -> u32 {
    triangular(level).saturating_add(2 * level.saturating_sub(1))
}

pub fn memory_reward(level: u32) -> u32 {
    triangular(level)
}

pub fn tictactoe_reward(result: GameResult) -> u32 {
    match result {
        GameResult::PlayerWin => 10,
        GameResult::Draw => 5,
        GameResult::PetWin => 2,
        GameResult::None => 0,
    }
}
