//! Shop catalogue: food price/restore table and one-time game unlocks.

use heapless::Vec;
use serde::Serialize;

/// Upper bound on simultaneously listed shop entries.
pub const MAX_SHOP_ITEMS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FoodKind {
    Apple,
    Bread,
    Cheese,
    Cake,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [Self::Apple, Self::Bread, Self::Cheese, Self::Cake];

    /// Food by its catalogue slot (0..=3).
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn cost(self) -> u32 {
        match self {
            Self::Apple => 10,
            Self::Bread => 15,
            Self::Cheese => 20,
            Self::Cake => 25,
        }
    }

    /// Hunger points restored (before clamping to 100).
    pub fn restore(self) -> u8 {
        match self {
            Self::Apple => 25,
            Self::Bread => 50,
            Self::Cheese => 75,
            Self::Cake => 100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Bread => "bread",
            Self::Cheese => "cheese",
            Self::Cake => "cake",
        }
    }
}

/// Anything the shop menu can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShopItem {
    Food(FoodKind),
    MemoryGame,
    TicTacToe,
}

impl ShopItem {
    pub fn label(self) -> &'static str {
        match self {
            Self::Food(food) => food.name(),
            Self::MemoryGame => "memory game",
            Self::TicTacToe => "tic-tac-toe",
        }
    }
}

/// Current shop listing.  Unlocks disappear once bought.
pub fn shop_items(memory_unlocked: bool, tictactoe_unlocked: bool) -> Vec<ShopItem, MAX_SHOP_ITEMS> {
    let unlocks = [
        (ShopItem::MemoryGame, !memory_unlocked),
        (ShopItem::TicTacToe, !tictactoe_unlocked),
    ];
    FoodKind::ALL
        .into_iter()
        .map(ShopItem::Food)
        .chain(unlocks.into_iter().filter_map(|(item, listed)| listed.then_some(item)))
        .collect()
}
