//! Tic-tac-toe against the pet.
//!
//! The pet's move is a three-step heuristic: complete its own line if it
//! can, otherwise (most of the time) block the player's open line,
//! otherwise pick a random empty cell.  It answers on the first
//! [`TicTacToeGame::update`] at least `move_delay_ms` after the player.

use heapless::Vec;
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::app::ports::StoragePort;

/// Storage namespace for the W/D/L counters.
pub const NAMESPACE: &str = "tictactoe";

const KEY_WINS: &str = "wins";
const KEY_DRAWS: &str = "draws";
const KEY_LOSSES: &str = "losses";

/// Every winning line as `(row, col)` triples: rows, then columns, then
/// the two diagonals.
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cell {
    Empty,
    Player,
    Pet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TicTacToeState {
    Idle,
    PlayerTurn,
    PetTurn,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    None,
    PlayerWin,
    PetWin,
    Draw,
}

pub type Board = [[Cell; 3]; 3];

#[derive(Debug, Clone)]
pub struct TicTacToeGame {
    board: Board,
    /// `(x, y)`: column, row.
    cursor: (usize, usize),
    state: TicTacToeState,
    result: GameResult,
    wins: u32,
    draws: u32,
    losses: u32,
    /// Set once the current game's outcome has been counted.
    recorded: bool,
    pet_turn_since: u64,
    move_delay_ms: u64,
    block_chance_percent: u8,
}

impl TicTacToeGame {
    pub fn new(move_delay_ms: u32, block_chance_percent: u8) -> Self {
        Self {
            board: [[Cell::Empty; 3]; 3],
            cursor: (1, 1),
            state: TicTacToeState::Idle,
            result: GameResult::None,
            wins: 0,
            draws: 0,
            losses: 0,
            recorded: false,
            pet_turn_since: 0,
            move_delay_ms: u64::from(move_delay_ms),
            block_chance_percent: block_chance_percent.min(100),
        }
    }

    pub fn load_stats(&mut self, store: &impl StoragePort) {
        let read = |key| u32::try_from(store.get_int(NAMESPACE, key, 0)).unwrap_or(0);
        self.wins = read(KEY_WINS);
        self.draws = read(KEY_DRAWS);
        self.losses = read(KEY_LOSSES);
        debug!(
            "tictactoe stats: {}W {}D {}L",
            self.wins, self.draws, self.losses
        );
    }

    /// Clear the board and toss for who starts.
    pub fn reset(&mut self, now: u64, rng: &mut impl Rng) {
        self.board = [[Cell::Empty; 3]; 3];
        self.cursor = (1, 1);
        self.result = GameResult::None;
        self.recorded = false;
        self.pet_turn_since = now;
        self.state = if rng.random_bool(0.5) {
            TicTacToeState::PlayerTurn
        } else {
            TicTacToeState::PetTurn
        };
        info!("tictactoe: new game, {:?} first", self.state);
    }

    /// Step the cursor to the next empty cell, row-major, wrapping.
    pub fn move_cursor(&mut self) {
        let (mut x, mut y) = self.cursor;
        for _ in 0..9 {
            x += 1;
            if x > 2 {
                x = 0;
                y = (y + 1) % 3;
            }
            if self.board[y][x] == Cell::Empty {
                break;
            }
        }
        self.cursor = (x, y);
    }

    /// Place the player's mark under the cursor.  `false` if it is not the
    /// player's turn or the cell is taken.
    pub fn try_place_piece(&mut self, now: u64) -> bool {
        if self.state != TicTacToeState::PlayerTurn {
            debug!("tictactoe: place ignored in {:?}", self.state);
            return false;
        }
        let (x, y) = self.cursor;
        if self.board[y][x] != Cell::Empty {
            return false;
        }
        self.board[y][x] = Cell::Player;
        if !self.settle() {
            self.state = TicTacToeState::PetTurn;
            self.pet_turn_since = now;
        }
        true
    }

    /// Let the pet answer once its thinking delay has passed.  Returns
    /// whether the pet moved.
    pub fn update(&mut self, now: u64, rng: &mut impl Rng) -> bool {
        if self.state != TicTacToeState::PetTurn
            || now.saturating_sub(self.pet_turn_since) < self.move_delay_ms
        {
            return false;
        }
        self.pet_move(rng);
        if !self.settle() {
            self.state = TicTacToeState::PlayerTurn;
            let (x, y) = self.cursor;
            if self.board[y][x] != Cell::Empty {
                self.move_cursor();
            }
        }
        true
    }

    fn pet_move(&mut self, rng: &mut impl Rng) {
        if let Some((r, c)) = self.completing_cell(Cell::Pet) {
            self.board[r][c] = Cell::Pet;
            return;
        }
        if rng.random_range(0..100u8) < self.block_chance_percent {
            if let Some((r, c)) = self.completing_cell(Cell::Player) {
                self.board[r][c] = Cell::Pet;
                return;
            }
        }
        let empties: Vec<(usize, usize), 9> = (0..9)
            .map(|i| (i / 3, i % 3))
            .filter(|&(r, c)| self.board[r][c] == Cell::Empty)
            .collect();
        if !empties.is_empty() {
            let (r, c) = empties[rng.random_range(0..empties.len())];
            self.board[r][c] = Cell::Pet;
        }
    }

    /// First empty cell that would give `owner` a full line.
    fn completing_cell(&self, owner: Cell) -> Option<(usize, usize)> {
        LINES.iter().find_map(|line| {
            let mut owned = 0;
            let mut empty = None;
            for &(r, c) in line {
                match self.board[r][c] {
                    cell if cell == owner => owned += 1,
                    Cell::Empty => empty = Some((r, c)),
                    _ => {}
                }
            }
            if owned == 2 { empty } else { None }
        })
    }

    fn has_line(&self, owner: Cell) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&(r, c)| self.board[r][c] == owner))
    }

    fn evaluate(&self) -> GameResult {
        if self.has_line(Cell::Player) {
            GameResult::PlayerWin
        } else if self.has_line(Cell::Pet) {
            GameResult::PetWin
        } else if self.filled_cells() == 9 {
            GameResult::Draw
        } else {
            GameResult::None
        }
    }

    /// End the game if the board is decided.  Returns whether it ended.
    fn settle(&mut self) -> bool {
        self.result = self.evaluate();
        if self.result == GameResult::None {
            return false;
        }
        self.state = TicTacToeState::GameOver;
        info!("tictactoe: {:?}", self.result);
        true
    }

    /// Count the finished game in the W/D/L record and persist it.  Only
    /// the first call per game counts.
    pub fn finish(&mut self, store: &mut impl StoragePort) -> bool {
        if self.state != TicTacToeState::GameOver || self.recorded {
            return false;
        }
        self.recorded = true;
        let (key, value) = match self.result {
            GameResult::PlayerWin => {
                self.wins += 1;
                (KEY_WINS, self.wins)
            }
            GameResult::Draw => {
                self.draws += 1;
                (KEY_DRAWS, self.draws)
            }
            GameResult::PetWin => {
                self.losses += 1;
                (KEY_LOSSES, self.losses)
            }
            GameResult::None => return false,
        };
        if let Err(e) = store.put_int(NAMESPACE, key, i32::try_from(value).unwrap_or(i32::MAX)) {
            warn!("tictactoe: failed to persist {}: {}", key, e);
        }
        true
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn state(&self) -> TicTacToeState {
        self.state
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.state == TicTacToeState::GameOver
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn filled_cells(&self) -> usize {
        self.board.iter().flatten().filter(|c| **c != Cell::Empty).count()
    }
}
