//! Inbound debug commands to the application controller.
//!
//! These come from a test harness or the host simulator's script, never
//! from the buttons.  The [`AppController`](super::controller::AppController)
//! only honours them while `test_mode` is enabled.

use crate::fsm::ModeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Refill hunger to 100.
    RestoreHunger,

    /// Refill boredom to 100.
    RestoreBoredom,

    /// Refill sleepiness to 100.
    RestoreSleepiness,

    /// Overwrite the coin balance.
    SetCoins(u32),

    /// Force the FSM into a specific mode.
    ForceMode(ModeId),
}

impl AppCommand {
    /// Parse a script line such as `restore hunger`, `coins 50` or
    /// `mode dodge`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let arg = words.next();
        match (verb, arg) {
            ("restore", Some("hunger")) => Some(Self::RestoreHunger),
            ("restore", Some("boredom")) => Some(Self::RestoreBoredom),
            ("restore", Some("sleep" | "sleepiness")) => Some(Self::RestoreSleepiness),
            ("coins", Some(n)) => n.parse().ok().map(Self::SetCoins),
            ("mode", Some(name)) => mode_by_name(name).map(Self::ForceMode),
            _ => None,
        }
    }
}

fn mode_by_name(name: &str) -> Option<ModeId> {
    Some(match name {
        "main" | "mainview" => ModeId::MainView,
        "menu" | "mainmenu" => ModeId::MainMenu,
        "games" | "gamemenu" => ModeId::GameMenu,
        "shop" | "shopmenu" => ModeId::ShopMenu,
        "dodge" => ModeId::Dodge,
        "memory" => ModeId::Memory,
        "tictactoe" => ModeId::TicTacToe,
        "result" => ModeId::GameResult,
        "sleeping" => ModeId::Sleeping,
        _ => return None,
    })
}
