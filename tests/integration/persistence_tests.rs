//! Persistence across controller restarts, boot-time wake-up and
//! behaviour under a failing store.

use crate::mock_hw::{MockNvs, Rig};

use pocketpet::app::commands::AppCommand;
use pocketpet::app::events::AppEvent;
use pocketpet::app::ports::StoragePort;
use pocketpet::app::snapshot::Mode;
use pocketpet::config::PetConfig;
use pocketpet::events::ButtonId;

fn fast_decay() -> PetConfig {
    PetConfig {
        decay_interval_ms: 1_000,
        test_mode: true,
        ..PetConfig::default()
    }
}

#[test]
fn pet_survives_a_restart() {
    let mut rig = Rig::new(fast_decay());
    rig.cmd(AppCommand::SetCoins(40));
    rig.wait(5_000);
    rig.main_menu_commit(0);
    let before = rig.app.snapshot();
    assert_eq!(before.coins, 30);

    let rebooted = Rig::with_store(fast_decay(), rig.nvs.clone());
    let after = rebooted.app.snapshot();
    assert_eq!(after.hunger, before.hunger);
    assert_eq!(after.boredom, before.boredom);
    assert_eq!(after.sleepiness, before.sleepiness);
    assert_eq!(after.coins, before.coins);
    assert!(!after.sleeping);
}

#[test]
fn pet_stored_asleep_wakes_quietly_at_boot() {
    let mut nvs = MockNvs::new();
    nvs.put_bool("tamagotchi", "sleeping", true).unwrap();
    nvs.put_int("tamagotchi", "sleep", 10).unwrap();
    nvs.put_int("tamagotchi", "hunger", 50).unwrap();

    let mut rig = Rig::with_store(PetConfig::default(), nvs);
    assert!(!rig.app.pet().is_sleeping());
    assert_eq!(rig.app.pet().hunger(), 50);
    assert_eq!(rig.app.pet().sleepiness(), 10);
    assert_eq!(rig.app.mode(), Mode::MainView);

    rig.wait(20);
    assert!(!rig.nvs.get_bool("tamagotchi", "sleeping", true));
    assert!(
        !rig.out
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::LowStat(_) | AppEvent::WokeUp))
    );
}

#[test]
fn out_of_range_values_are_clamped_on_load() {
    let mut nvs = MockNvs::new();
    nvs.put_int("tamagotchi", "hunger", 250).unwrap();
    nvs.put_int("tamagotchi", "boredom", -3).unwrap();
    nvs.put_int("tamagotchi", "coins", -5).unwrap();

    let rig = Rig::with_store(PetConfig::default(), nvs);
    assert_eq!(rig.app.pet().hunger(), 100);
    assert_eq!(rig.app.pet().boredom(), 0);
    assert_eq!(rig.app.pet().coins(), 0);
}

#[test]
fn unlocks_and_records_survive_a_restart() {
    let mut rig = Rig::test_mode();
    rig.cmd(AppCommand::SetCoins(100));
    rig.cmd(AppCommand::ForceMode(pocketpet::fsm::ModeId::ShopMenu));
    // Last entry is tic-tac-toe.
    rig.tap(ButtonId::Left);
    rig.long(ButtonId::Action);
    assert!(rig.app.pet().tictactoe_unlocked());

    rig.wait(3_100);
    rig.cmd(AppCommand::ForceMode(pocketpet::fsm::ModeId::Dodge));
    rig.long(ButtonId::Action);

    let rebooted = Rig::with_store(PetConfig::default(), rig.nvs.clone());
    assert!(rebooted.app.pet().tictactoe_unlocked());
    assert!(!rebooted.app.pet().memory_unlocked());
    assert_eq!(rebooted.app.dodge().record(), 1);
}

#[test]
fn failing_store_never_stops_the_pet() {
    let mut rig = Rig::with_store(fast_decay(), MockNvs::failing());
    rig.cmd(AppCommand::SetCoins(10));
    rig.wait(5_000);
    rig.main_menu_commit(0);

    assert_eq!(rig.app.pet().hunger(), 100);
    assert_eq!(rig.app.pet().coins(), 0);
    assert!(rig.app.pet().is_dirty());
    assert_eq!(rig.nvs.len(), 0);
}
