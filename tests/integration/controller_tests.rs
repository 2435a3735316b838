//! End-to-end flows through `AppController` with mock adapters: menus,
//! overlays, the shop, sleep and all three mini-games.

use crate::mock_hw::Rig;

use pocketpet::app::commands::AppCommand;
use pocketpet::app::events::{AppEvent, AudioCue};
use pocketpet::app::ports::StoragePort;
use pocketpet::app::snapshot::{Mode, Overlay};
use pocketpet::config::PetConfig;
use pocketpet::events::ButtonId;
use pocketpet::fsm::ModeId;
use pocketpet::games::memory::{MemoryState, Symbol};
use pocketpet::games::tictactoe::{Cell, GameResult};
use pocketpet::games::{GameKind, GameSummary, dodge_reward, memory_reward, tictactoe_reward};
use pocketpet::pet::Stat;
use pocketpet::pet::shop::ShopItem;

const FEED: usize = 0;
const SHOP: usize = 1;
const GAMES: usize = 2;
const SLEEP: usize = 3;

fn fast_decay() -> PetConfig {
    PetConfig {
        decay_interval_ms: 1_000,
        test_mode: true,
        ..PetConfig::default()
    }
}

// ── Feeding ───────────────────────────────────────────────────

#[test]
fn fresh_pet_feed_is_refused_for_coins_then_for_fullness() {
    let mut rig = Rig::test_mode();
    assert_eq!(rig.app.mode(), Mode::MainView);

    rig.main_menu_commit(FEED);
    assert_eq!(rig.app.mode_id(), ModeId::MainView);
    assert_eq!(rig.app.mode(), Mode::InsufficientCoinsOverlay);
    assert_eq!(rig.app.pet().coins(), 0);
    assert!(rig.out.saw(&AppEvent::OverlayShown(Overlay::InsufficientCoins)));

    rig.wait(3_100);
    assert_eq!(rig.app.mode(), Mode::MainView);

    rig.cmd(AppCommand::SetCoins(10));
    rig.main_menu_commit(FEED);
    assert_eq!(rig.app.mode(), Mode::AngryOverlay);
    assert_eq!(rig.app.pet().coins(), 10);
    assert_eq!(rig.app.pet().hunger(), 100);
    assert_eq!(rig.out.count_cue(AudioCue::Angry), 1);
}

#[test]
fn feeding_a_hungry_pet_spends_coins_and_cheers() {
    let mut rig = Rig::new(fast_decay());
    rig.cmd(AppCommand::SetCoins(10));
    rig.wait(5_000);
    assert_eq!(rig.app.pet().hunger(), 80);

    rig.main_menu_commit(FEED);
    let pet = rig.app.pet();
    assert_eq!(pet.hunger(), 100);
    assert_eq!(pet.coins(), 0);
    assert_eq!(pet.sleepiness(), 90);
    assert_eq!(rig.app.mode(), Mode::HappyOverlay);
}

// ── Menus ─────────────────────────────────────────────────────

#[test]
fn idle_menu_closes_after_timeout() {
    let mut rig = Rig::test_mode();
    rig.tap(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::MainMenu);

    rig.wait(4_900);
    assert_eq!(rig.app.mode(), Mode::MainMenu);
    rig.wait(200);
    assert_eq!(rig.app.mode(), Mode::MainView);
    assert!(rig.out.saw(&AppEvent::ModeChanged {
        from: Mode::MainMenu,
        to: Mode::MainView,
    }));
}

#[test]
fn navigation_restarts_menu_timeout() {
    let mut rig = Rig::test_mode();
    rig.tap(ButtonId::Action);
    rig.wait(4_000);
    rig.tap(ButtonId::Right);
    rig.wait(4_000);
    assert_eq!(rig.app.mode(), Mode::MainMenu);
    assert_eq!(rig.app.snapshot().menu.map(|m| m.selected), Some(1));
    rig.wait(1_200);
    assert_eq!(rig.app.mode(), Mode::MainView);
}

#[test]
fn left_wraps_to_last_menu_entry() {
    let mut rig = Rig::test_mode();
    rig.tap(ButtonId::Action);
    rig.tap(ButtonId::Left);
    let menu = rig.app.snapshot().menu.expect("menu open");
    assert_eq!(menu.selected, SLEEP);
    assert_eq!(menu.items.as_slice(), &["feed", "shop", "games", "sleep"]);
}

// ── Sleep ─────────────────────────────────────────────────────

#[test]
fn tired_pet_sleeps_and_wakes_grumpy() {
    let mut rig = Rig::new(fast_decay());
    rig.wait(80_000);
    assert_eq!(rig.app.pet().sleepiness(), 20);
    assert_eq!(rig.app.pet().hunger(), 0);
    let hunger_lows = rig
        .out
        .events
        .iter()
        .filter(|e| **e == AppEvent::LowStat(Stat::Hunger))
        .count();
    assert_eq!(hunger_lows, 1);

    rig.main_menu_commit(SLEEP);
    assert_eq!(rig.app.mode(), Mode::Sleeping);
    assert!(rig.out.saw(&AppEvent::FellAsleep));

    rig.tap(ButtonId::Left);
    assert!(!rig.app.pet().is_sleeping());
    assert_eq!(rig.app.mode_id(), ModeId::MainView);
    assert_eq!(rig.app.mode(), Mode::AngryOverlay);
    assert!(rig.out.saw(&AppEvent::WokeUp));
}

#[test]
fn rested_pet_refuses_to_sleep() {
    let mut rig = Rig::test_mode();
    rig.main_menu_commit(SLEEP);
    assert!(!rig.app.pet().is_sleeping());
    assert_eq!(rig.app.mode(), Mode::AngryOverlay);
}

// ── Shop ──────────────────────────────────────────────────────

#[test]
fn failed_purchase_keeps_shop_open_under_overlay() {
    let mut rig = Rig::test_mode();
    rig.main_menu_commit(SHOP);
    assert_eq!(rig.app.mode(), Mode::ShopMenu);

    rig.long(ButtonId::Action);
    assert_eq!(rig.app.mode_id(), ModeId::ShopMenu);
    assert_eq!(rig.app.mode(), Mode::InsufficientCoinsOverlay);
    assert!(rig.out.saw(&AppEvent::PurchaseRejected(ShopItem::Food(
        pocketpet::pet::shop::FoodKind::Apple
    ))));
}

// ── Games ─────────────────────────────────────────────────────

#[test]
fn dodge_quit_pays_out_and_returns_home() {
    let mut rig = Rig::test_mode();
    rig.main_menu_commit(GAMES);
    assert_eq!(rig.app.mode(), Mode::GameMenu);

    rig.long(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::InGame(GameKind::Dodge));
    assert_eq!(rig.app.pet().hunger(), 85);

    rig.long(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::GameResult(GameKind::Dodge));
    assert_eq!(rig.app.pet().coins(), dodge_reward(1));
    assert!(rig.out.saw(&AppEvent::GameFinished(GameSummary::dodge(1))));
    assert_eq!(rig.nvs.get_int("tamagotchi", "gameRecord", 0), 1);

    // Result screen ignores buttons.
    rig.tap(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::GameResult(GameKind::Dodge));

    rig.wait(3_000);
    assert_eq!(rig.app.mode_id(), ModeId::MainView);
    assert_eq!(rig.app.mode(), Mode::HappyOverlay);
}

#[test]
fn memory_game_bought_played_and_lost() {
    let mut rig = Rig::test_mode();
    rig.cmd(AppCommand::SetCoins(50));

    rig.main_menu_commit(SHOP);
    rig.tap(ButtonId::Left);
    rig.tap(ButtonId::Left);
    rig.long(ButtonId::Action);
    assert!(rig.out.saw(&AppEvent::Purchased(ShopItem::MemoryGame)));
    assert!(rig.app.pet().memory_unlocked());
    assert_eq!(rig.app.pet().coins(), 0);
    assert_eq!(rig.app.mode(), Mode::HappyOverlay);
    rig.wait(3_100);

    rig.main_menu_commit(GAMES);
    rig.tap(ButtonId::Right);
    rig.long(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::InGame(GameKind::Memory));

    rig.wait(1_000);
    assert_eq!(rig.app.memory().state(), MemoryState::WaitingInput);
    assert!(rig.out.count_cue(AudioCue::Dot) + rig.out.count_cue(AudioCue::Dash) >= 1);

    let held = match rig.app.memory().sequence()[0] {
        Symbol::Dot => 100,
        Symbol::Dash => 600,
    };
    rig.press(ButtonId::Action, held);
    assert_eq!(rig.app.memory().level(), 1);
    assert_eq!(rig.app.memory().sequence().len(), 2);

    // Nobody answers the second round.
    rig.wait(8_000);
    assert_eq!(rig.app.memory().state(), MemoryState::GameOver);
    assert_eq!(rig.app.mode(), Mode::InGame(GameKind::Memory));

    rig.tap(ButtonId::Action);
    assert_eq!(rig.app.mode(), Mode::GameResult(GameKind::Memory));
    assert_eq!(rig.app.pet().coins(), memory_reward(1));
    assert_eq!(rig.nvs.get_int("tamagotchi", "memHighScore", 0), 1);
}

#[test]
fn tictactoe_plays_to_a_recorded_result() {
    let mut rig = Rig::test_mode();
    rig.cmd(AppCommand::ForceMode(ModeId::TicTacToe));
    assert_eq!(rig.app.mode(), Mode::InGame(GameKind::TicTacToe));

    for _ in 0..200 {
        if rig.app.mode_id() != ModeId::TicTacToe {
            break;
        }
        let (x, y) = rig.app.tictactoe().cursor();
        if rig.app.tictactoe().board()[y][x] == Cell::Empty {
            rig.long(ButtonId::Action);
        } else {
            rig.tap(ButtonId::Action);
        }
        rig.wait(700);
    }

    assert_eq!(rig.app.mode_id(), ModeId::GameResult);
    let result = rig.app.tictactoe().result();
    assert_ne!(result, GameResult::None);
    assert_eq!(rig.app.pet().coins(), tictactoe_reward(result));

    let recorded = rig.nvs.get_int("tictactoe", "wins", 0)
        + rig.nvs.get_int("tictactoe", "draws", 0)
        + rig.nvs.get_int("tictactoe", "losses", 0);
    assert_eq!(recorded, 1);
}

#[test]
fn debug_commands_refused_outside_test_mode() {
    let mut rig = Rig::new(PetConfig::default());
    let result = rig.app.handle_command(
        AppCommand::RestoreHunger,
        rig.now,
        &mut rig.nvs,
        &mut rig.out,
    );
    assert!(result.is_err());
}

// ── Test-mode hold gestures ───────────────────────────────────

#[test]
fn three_button_chord_toggles_test_mode() {
    let mut rig = Rig::new(PetConfig::default());
    assert!(!rig.app.test_mode());

    rig.hold(&ButtonId::ALL, 3_100);
    assert!(rig.app.test_mode());
    assert!(rig.app.snapshot().test_mode);
    assert!(rig.out.saw(&AppEvent::TestModeChanged(true)));
    assert_eq!(rig.out.count_cue(AudioCue::Beep), 2);
    // The releases end the gesture; none of them opens the menu.
    assert_eq!(rig.app.mode(), Mode::MainView);
    rig.cmd(AppCommand::SetCoins(12));

    rig.hold(&ButtonId::ALL, 3_100);
    assert!(!rig.app.test_mode());
    assert!(rig.out.saw(&AppEvent::TestModeChanged(false)));
    assert_eq!(rig.out.count_cue(AudioCue::Beep), 3);
    let refused = rig.app.handle_command(
        AppCommand::SetCoins(99),
        rig.now,
        &mut rig.nvs,
        &mut rig.out,
    );
    assert!(refused.is_err());
    assert_eq!(rig.app.pet().coins(), 12);
}

#[test]
fn test_mode_hold_in_main_view_refills_one_stat() {
    let mut rig = Rig::new(fast_decay());
    // Off the decay grid so no decay step lands right after the refill.
    rig.wait(5_500);
    assert!(rig.app.pet().hunger() < 100);

    rig.hold(&[ButtonId::Left], 2_100);
    assert_eq!(rig.app.pet().hunger(), 100);
    assert!(rig.app.pet().boredom() < 100);
    assert!(rig.app.pet().sleepiness() < 100);
    assert_eq!(rig.app.mode(), Mode::MainView);
    assert_eq!(rig.out.count_cue(AudioCue::Beep), 1);

    rig.hold(&[ButtonId::Action], 2_100);
    assert_eq!(rig.app.pet().boredom(), 100);
    rig.hold(&[ButtonId::Right], 2_100);
    assert_eq!(rig.app.pet().sleepiness(), 100);
}

#[test]
fn long_hold_outside_test_mode_just_opens_the_menu() {
    let mut rig = Rig::new(PetConfig {
        decay_interval_ms: 1_000,
        ..PetConfig::default()
    });
    rig.wait(5_500);

    rig.hold(&[ButtonId::Left], 2_100);
    assert!(rig.app.pet().hunger() < 100);
    assert_eq!(rig.app.mode(), Mode::MainMenu);
}

#[test]
fn test_mode_holds_in_shop_set_coins_without_buying() {
    let mut rig = Rig::test_mode();
    rig.cmd(AppCommand::SetCoins(7));
    rig.cmd(AppCommand::ForceMode(ModeId::ShopMenu));

    rig.hold(&[ButtonId::Right], 3_100);
    assert_eq!(rig.app.pet().coins(), 50);
    assert_eq!(rig.app.mode(), Mode::ShopMenu);

    rig.hold(&[ButtonId::Left], 3_100);
    assert_eq!(rig.app.pet().coins(), 0);
    assert_eq!(rig.app.mode(), Mode::ShopMenu);
    assert!(
        !rig.out
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::Purchased(_) | AppEvent::PurchaseRejected(_)))
    );
}
