//! Engine configuration parameters
//!
//! All tunable timing and policy knobs for the PocketPet engine.
//! Fixed gameplay tables (food prices, level curves) live next to the
//! code that uses them; this struct only carries values a build or a
//! stored profile may legitimately change.  Values can be overridden via
//! the NVS config blob.

use serde::{Deserialize, Serialize};

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetConfig {
    // --- Pet decay ---
    /// Period of the awake decay step (milliseconds)
    pub decay_interval_ms: u32,
    /// Sleepiness only decays every N-th decay step (1 = every step)
    pub sleepiness_decay_divider: u8,
    /// Period of the +1 sleepiness recovery while asleep (milliseconds)
    pub sleep_recovery_interval_ms: u32,
    /// How long the angry / happy / insufficient-coins flags stay up
    pub flag_duration_ms: u32,

    // --- Economy ---
    /// Coins needed to unlock the memory game
    pub memory_unlock_cost: u32,
    /// Coins needed to unlock tic-tac-toe
    pub tictactoe_unlock_cost: u32,

    // --- Input ---
    /// Hold duration at or above which a release counts as a long press
    pub long_press_ms: u32,
    /// Hold duration at or above which a memory-game input is a dash
    pub dash_threshold_ms: u32,
    /// Menus close after this long without input
    pub menu_timeout_ms: u32,

    // --- Games ---
    /// How long the end-of-game screen is held before returning home
    pub game_result_hold_ms: u32,
    /// Delay before the pet answers a tic-tac-toe move
    pub pet_move_delay_ms: u32,
    /// Chance (0-100) that the pet blocks an open player line
    pub block_chance_percent: u8,

    // --- Diagnostics ---
    /// Test mode at boot.  Toggled at runtime by holding all three buttons.
    pub test_mode: bool,
    /// How long the three-button chord must be held to toggle test mode
    pub test_chord_ms: u32,
    /// Single-button hold in the main view that refills a stat (test mode)
    pub restore_hold_ms: u32,
    /// Single-button hold in the shop that overwrites the coins (test mode)
    pub coin_hold_ms: u32,
    /// Interval between stat heartbeat log lines (milliseconds)
    pub heartbeat_interval_ms: u32,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            // Pet decay
            decay_interval_ms: 60_000, // 1/min
            sleepiness_decay_divider: 1,
            sleep_recovery_interval_ms: 5_000,
            flag_duration_ms: 3_000,

            // Economy
            memory_unlock_cost: 50,
            tictactoe_unlock_cost: 100,

            // Input
            long_press_ms: 500,
            dash_threshold_ms: 400,
            menu_timeout_ms: 5_000,

            // Games
            game_result_hold_ms: 3_000,
            pet_move_delay_ms: 500,
            block_chance_percent: 85,

            // Diagnostics
            test_mode: false,
            test_chord_ms: 3_000,
            restore_hold_ms: 2_000,
            coin_hold_ms: 3_000,
            heartbeat_interval_ms: 2_000,
        }
    }
}
