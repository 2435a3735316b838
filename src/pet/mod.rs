//! The pet: needs, coins, unlocks, timed flags and the rules that move them.
//!
//! `PetModel` is pure domain state.  It never sleeps, never blocks and never
//! touches a port except inside [`PetModel::load`] / [`PetModel::save`].
//! Every time-dependent operation takes the current monotonic `now_ms`.
//!
//! ```text
//!            ┌───────── decay every 60 s ─────────┐
//!            ▼                                     │
//!   AWAKE ──[sleep(), sleepiness ≤ 20]──▶ ASLEEP ──┘
//!     ▲                                     │
//!     └──[wake_up() / sleepiness hits 100]──┘
//! ```

pub mod mood;
pub mod shop;

use heapless::Vec;
use log::{debug, info};
use serde::Serialize;

use crate::app::ports::{StorageError, StoragePort};
use crate::config::PetConfig;
use mood::{Mood, MoodInputs, derive_mood};
use shop::{FoodKind, ShopItem};

pub use mood::MOOD_THRESHOLD;

/// Storage namespace for everything the pet owns.
pub const NAMESPACE: &str = "tamagotchi";

const KEY_HUNGER: &str = "hunger";
const KEY_BOREDOM: &str = "boredom";
const KEY_SLEEPINESS: &str = "sleep";
const KEY_COINS: &str = "coins";
const KEY_SLEEPING: &str = "sleeping";
const KEY_MEMORY_UNLOCK: &str = "memgame-unlock";
const KEY_TICTACTOE_UNLOCK: &str = "tictactoe-unlock";

pub const STAT_MAX: u8 = 100;

/// A stat at or below this value raises [`PetSignal::LowStat`].
pub const LOW_STAT_THRESHOLD: u8 = 20;

/// The pet refuses to sleep above, and wakes up grumpy at or below, this.
pub const SLEEP_THRESHOLD: u8 = 20;

pub const FEED_COST: u32 = 10;
const FEED_RESTORE: u8 = 20;
const FEED_SLEEPINESS_COST: u8 = 5;
/// Feeding a pet this full makes it angry instead.
const FEED_FULL_THRESHOLD: u8 = 80;

const PLAY_HUNGER_COST: u8 = 15;
const PLAY_SLEEPINESS_COST: u8 = 15;

const WAKE_BOREDOM_GAIN: u8 = 20;
const WAKE_HUNGER_COST: u8 = 15;

const HUNGER_DECAY: u8 = 4;
const BOREDOM_DECAY: u8 = 2;
const SLEEPINESS_DECAY: u8 = 1;

const MAX_PENDING_SIGNALS: usize = 8;

// ---------------------------------------------------------------------------
// Public value types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stat {
    Hunger,
    Boredom,
    Sleepiness,
}

impl Stat {
    pub const ALL: [Stat; 3] = [Self::Hunger, Self::Boredom, Self::Sleepiness];

    fn index(self) -> usize {
        match self {
            Self::Hunger => 0,
            Self::Boredom => 1,
            Self::Sleepiness => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Boredom => "boredom",
            Self::Sleepiness => "sleepiness",
        }
    }
}

/// Modal overlays, derived from the pet's timed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    Angry,
    Happy,
    InsufficientCoins,
}

/// Notable things that happened inside the model since the last drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetSignal {
    LowStat(Stat),
    FellAsleep,
    WokeUp,
}

pub type Signals = Vec<PetSignal, MAX_PENDING_SIGNALS>;

// ---------------------------------------------------------------------------
// Timed flag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct TimedFlag {
    until: Option<u64>,
}

impl TimedFlag {
    fn raise(&mut self, now: u64, duration_ms: u32) {
        self.until = Some(now.saturating_add(u64::from(duration_ms)));
    }

    fn is_active(&self, now: u64) -> bool {
        matches!(self.until, Some(t) if now < t)
    }

    fn expire(&mut self, now: u64) {
        if !self.is_active(now) {
            self.until = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Rules copied out of the config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct PetRules {
    decay_interval_ms: u64,
    sleepiness_divider: u32,
    recovery_interval_ms: u64,
    flag_duration_ms: u32,
    memory_unlock_cost: u32,
    tictactoe_unlock_cost: u32,
}

impl PetRules {
    fn from_config(config: &PetConfig) -> Self {
        Self {
            decay_interval_ms: u64::from(config.decay_interval_ms.max(1)),
            sleepiness_divider: u32::from(config.sleepiness_decay_divider.max(1)),
            recovery_interval_ms: u64::from(config.sleep_recovery_interval_ms.max(1)),
            flag_duration_ms: config.flag_duration_ms,
            memory_unlock_cost: config.memory_unlock_cost,
            tictactoe_unlock_cost: config.tictactoe_unlock_cost,
        }
    }
}

// ---------------------------------------------------------------------------
// PetModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PetModel {
    hunger: u8,
    boredom: u8,
    sleepiness: u8,
    coins: u32,
    sleeping: bool,
    memory_unlocked: bool,
    tictactoe_unlocked: bool,

    angry: TimedFlag,
    happy: TimedFlag,
    insufficient_coins: TimedFlag,

    last_decay_at: u64,
    decay_steps: u32,
    sleep_started_at: u64,
    last_recovery_at: u64,

    /// Per-stat edge detector for [`PetSignal::LowStat`].
    low_armed: [bool; 3],
    pending: Signals,
    rules: PetRules,
    dirty: bool,
}

impl PetModel {
    /// A brand-new pet: fully satisfied, broke, nothing unlocked.
    pub fn new(config: &PetConfig) -> Self {
        Self {
            hunger: STAT_MAX,
            boredom: STAT_MAX,
            sleepiness: STAT_MAX,
            coins: 0,
            sleeping: false,
            memory_unlocked: false,
            tictactoe_unlocked: false,
            angry: TimedFlag::default(),
            happy: TimedFlag::default(),
            insufficient_coins: TimedFlag::default(),
            last_decay_at: 0,
            decay_steps: 0,
            sleep_started_at: 0,
            last_recovery_at: 0,
            low_armed: [true; 3],
            pending: Signals::new(),
            rules: PetRules::from_config(config),
            dirty: false,
        }
    }

    /// Restore a pet from storage.  Missing or unreadable keys fall back to
    /// the fresh-pet values.
    pub fn load(store: &impl StoragePort, config: &PetConfig) -> Self {
        let mut pet = Self::new(config);
        let stat = |key: &str| clamp_stat(store.get_int(NAMESPACE, key, i32::from(STAT_MAX)));

        pet.hunger = stat(KEY_HUNGER);
        pet.boredom = stat(KEY_BOREDOM);
        pet.sleepiness = stat(KEY_SLEEPINESS);
        pet.coins = u32::try_from(store.get_int(NAMESPACE, KEY_COINS, 0)).unwrap_or(0);
        pet.sleeping = store.get_bool(NAMESPACE, KEY_SLEEPING, false);
        pet.memory_unlocked = store.get_bool(NAMESPACE, KEY_MEMORY_UNLOCK, false);
        pet.tictactoe_unlocked = store.get_bool(NAMESPACE, KEY_TICTACTOE_UNLOCK, false);

        info!(
            "pet loaded: hunger={} boredom={} sleepiness={} coins={} sleeping={}",
            pet.hunger, pet.boredom, pet.sleepiness, pet.coins, pet.sleeping
        );
        pet
    }

    /// Anchor the decay clocks at boot.  A pet that was stored asleep wakes
    /// up quietly, with no wake-up penalties.
    pub fn begin(&mut self, now: u64) {
        self.last_decay_at = now;
        self.last_recovery_at = now;
        if self.sleeping {
            info!("pet was asleep at power-off, waking");
            self.sleeping = false;
            self.dirty = true;
        }
        for stat in Stat::ALL {
            self.low_armed[stat.index()] = self.stat(stat) > LOW_STAT_THRESHOLD;
        }
    }

    /// Persist every pet key.  No-op unless something changed since the
    /// last successful save.
    pub fn save(&mut self, store: &mut impl StoragePort) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        store.put_int(NAMESPACE, KEY_HUNGER, i32::from(self.hunger))?;
        store.put_int(NAMESPACE, KEY_BOREDOM, i32::from(self.boredom))?;
        store.put_int(NAMESPACE, KEY_SLEEPINESS, i32::from(self.sleepiness))?;
        store.put_int(NAMESPACE, KEY_COINS, i32::try_from(self.coins).unwrap_or(i32::MAX))?;
        store.put_bool(NAMESPACE, KEY_SLEEPING, self.sleeping)?;
        store.put_bool(NAMESPACE, KEY_MEMORY_UNLOCK, self.memory_unlocked)?;
        store.put_bool(NAMESPACE, KEY_TICTACTOE_UNLOCK, self.tictactoe_unlocked)?;
        self.dirty = false;
        debug!("pet saved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance timers to `now`.  Long gaps are caught up step by step.
    pub fn tick(&mut self, now: u64) {
        self.angry.expire(now);
        self.happy.expire(now);
        self.insufficient_coins.expire(now);

        if self.sleeping {
            self.recover(now);
        } else {
            self.decay(now);
        }

        if !self.sleeping && self.sleepiness == 0 {
            self.sleep(now);
        }
        self.update_low_stat_edges();
    }

    fn recover(&mut self, now: u64) {
        let interval = self.rules.recovery_interval_ms;
        while now.saturating_sub(self.last_recovery_at) >= interval {
            self.last_recovery_at += interval;
            self.sleepiness = self.sleepiness.saturating_add(1).min(STAT_MAX);
            self.dirty = true;
            if self.sleepiness >= STAT_MAX {
                info!("pet fully rested");
                self.wake_up(now);
                break;
            }
        }
    }

    fn decay(&mut self, now: u64) {
        let interval = self.rules.decay_interval_ms;
        while now.saturating_sub(self.last_decay_at) >= interval {
            self.last_decay_at += interval;
            self.hunger = self.hunger.saturating_sub(HUNGER_DECAY);
            self.boredom = self.boredom.saturating_sub(BOREDOM_DECAY);
            self.decay_steps = self.decay_steps.wrapping_add(1);
            if self.decay_steps % self.rules.sleepiness_divider == 0 {
                self.sleepiness = self.sleepiness.saturating_sub(SLEEPINESS_DECAY);
            }
            self.dirty = true;
            if self.sleepiness == 0 {
                break;
            }
        }
    }

    fn update_low_stat_edges(&mut self) {
        for stat in Stat::ALL {
            let idx = stat.index();
            if self.stat(stat) <= LOW_STAT_THRESHOLD {
                if self.low_armed[idx] {
                    self.low_armed[idx] = false;
                    info!("{} is low ({})", stat.name(), self.stat(stat));
                    self.signal(PetSignal::LowStat(stat));
                }
            } else {
                self.low_armed[idx] = true;
            }
        }
    }

    fn signal(&mut self, s: PetSignal) {
        if self.pending.push(s).is_err() {
            debug!("pet signal buffer full, dropping {:?}", s);
        }
    }

    /// Take every signal raised since the previous call.
    pub fn drain_signals(&mut self) -> Signals {
        core::mem::take(&mut self.pending)
    }

    // -----------------------------------------------------------------------
    // Care actions
    // -----------------------------------------------------------------------

    pub fn feed(&mut self, now: u64) -> bool {
        if self.sleeping {
            debug!("feed ignored: pet is asleep");
            return false;
        }
        if self.coins < FEED_COST {
            self.insufficient_coins.raise(now, self.rules.flag_duration_ms);
            return false;
        }
        if self.hunger > FEED_FULL_THRESHOLD {
            self.angry.raise(now, self.rules.flag_duration_ms);
            return false;
        }
        self.coins -= FEED_COST;
        self.hunger = add_stat(self.hunger, FEED_RESTORE);
        self.sleepiness = self.sleepiness.saturating_sub(FEED_SLEEPINESS_COST);
        self.happy.raise(now, self.rules.flag_duration_ms);
        self.dirty = true;
        info!("fed: hunger={} coins={}", self.hunger, self.coins);
        true
    }

    /// Pay the energy cost of a mini-game.  Refused while asleep.
    pub fn play(&mut self) -> bool {
        if self.sleeping {
            debug!("play ignored: pet is asleep");
            return false;
        }
        self.hunger = self.hunger.saturating_sub(PLAY_HUNGER_COST);
        self.sleepiness = self.sleepiness.saturating_sub(PLAY_SLEEPINESS_COST);
        self.dirty = true;
        true
    }

    pub fn sleep(&mut self, now: u64) -> bool {
        if self.sleeping {
            return false;
        }
        if self.sleepiness > SLEEP_THRESHOLD {
            self.angry.raise(now, self.rules.flag_duration_ms);
            return false;
        }
        self.sleeping = true;
        self.sleep_started_at = now;
        self.last_recovery_at = now;
        self.dirty = true;
        info!("pet fell asleep (sleepiness={})", self.sleepiness);
        self.signal(PetSignal::FellAsleep);
        true
    }

    pub fn wake_up(&mut self, now: u64) -> bool {
        if !self.sleeping {
            return false;
        }
        if self.sleepiness <= SLEEP_THRESHOLD {
            self.angry.raise(now, self.rules.flag_duration_ms);
        }
        self.sleeping = false;
        self.boredom = add_stat(self.boredom, WAKE_BOREDOM_GAIN);
        self.hunger = self.hunger.saturating_sub(WAKE_HUNGER_COST);
        self.last_decay_at = now;
        self.dirty = true;
        info!(
            "pet woke up after {} ms (sleepiness={})",
            now.saturating_sub(self.sleep_started_at),
            self.sleepiness
        );
        self.signal(PetSignal::WokeUp);
        true
    }

    pub fn add_coins(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.coins = self.coins.saturating_add(amount);
        self.dirty = true;
    }

    pub fn add_boredom(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        let gain = u8::try_from(amount).unwrap_or(STAT_MAX);
        self.boredom = add_stat(self.boredom, gain);
        self.dirty = true;
    }

    /// Raise the happy flag from outside (game payout display).
    pub fn cheer(&mut self, now: u64) {
        self.happy.raise(now, self.rules.flag_duration_ms);
    }

    // -----------------------------------------------------------------------
    // Shop
    // -----------------------------------------------------------------------

    pub fn buy_food(&mut self, food: FoodKind, now: u64) -> bool {
        if !self.spend(food.cost(), now) {
            return false;
        }
        self.hunger = add_stat(self.hunger, food.restore());
        info!("bought {}: hunger={} coins={}", food.name(), self.hunger, self.coins);
        true
    }

    pub fn buy_memory_game(&mut self, now: u64) -> bool {
        if self.memory_unlocked {
            debug!("memory game already unlocked");
            return false;
        }
        if !self.spend(self.rules.memory_unlock_cost, now) {
            return false;
        }
        self.memory_unlocked = true;
        info!("memory game unlocked");
        true
    }

    pub fn buy_tictactoe_game(&mut self, now: u64) -> bool {
        if self.tictactoe_unlocked {
            debug!("tic-tac-toe already unlocked");
            return false;
        }
        if !self.spend(self.rules.tictactoe_unlock_cost, now) {
            return false;
        }
        self.tictactoe_unlocked = true;
        info!("tic-tac-toe unlocked");
        true
    }

    pub fn purchase(&mut self, item: ShopItem, now: u64) -> bool {
        match item {
            ShopItem::Food(food) => self.buy_food(food, now),
            ShopItem::MemoryGame => self.buy_memory_game(now),
            ShopItem::TicTacToe => self.buy_tictactoe_game(now),
        }
    }

    /// Deduct `cost` and cheer, or raise the insufficient-coins flag.
    fn spend(&mut self, cost: u32, now: u64) -> bool {
        if self.coins < cost {
            self.insufficient_coins.raise(now, self.rules.flag_duration_ms);
            return false;
        }
        self.coins -= cost;
        self.happy.raise(now, self.rules.flag_duration_ms);
        self.dirty = true;
        true
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn mood(&self, now: u64) -> Mood {
        derive_mood(&MoodInputs {
            happy: self.happy.is_active(now),
            angry: self.angry.is_active(now),
            hunger: self.hunger,
            boredom: self.boredom,
            sleepiness: self.sleepiness,
        })
    }

    /// The overlay that should currently cover the screen, if any.
    /// Angry beats Happy beats InsufficientCoins.
    pub fn overlay(&self, now: u64) -> Option<Overlay> {
        if self.angry.is_active(now) {
            Some(Overlay::Angry)
        } else if self.happy.is_active(now) {
            Some(Overlay::Happy)
        } else if self.insufficient_coins.is_active(now) {
            Some(Overlay::InsufficientCoins)
        } else {
            None
        }
    }

    pub fn stat(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hunger => self.hunger,
            Stat::Boredom => self.boredom,
            Stat::Sleepiness => self.sleepiness,
        }
    }

    pub fn hunger(&self) -> u8 {
        self.hunger
    }

    pub fn boredom(&self) -> u8 {
        self.boredom
    }

    pub fn sleepiness(&self) -> u8 {
        self.sleepiness
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn memory_unlocked(&self) -> bool {
        self.memory_unlocked
    }

    pub fn tictactoe_unlocked(&self) -> bool {
        self.tictactoe_unlocked
    }

    pub fn is_angry(&self, now: u64) -> bool {
        self.angry.is_active(now)
    }

    pub fn is_happy(&self, now: u64) -> bool {
        self.happy.is_active(now)
    }

    pub fn is_short_of_coins(&self, now: u64) -> bool {
        self.insufficient_coins.is_active(now)
    }

    /// Unsaved changes pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -----------------------------------------------------------------------
    // Debug restores
    // -----------------------------------------------------------------------

    pub fn set_hunger(&mut self, value: u8) {
        self.hunger = value.min(STAT_MAX);
        self.dirty = true;
    }

    pub fn set_boredom(&mut self, value: u8) {
        self.boredom = value.min(STAT_MAX);
        self.dirty = true;
    }

    pub fn set_sleepiness(&mut self, value: u8) {
        self.sleepiness = value.min(STAT_MAX);
        self.dirty = true;
    }

    pub fn set_coins(&mut self, value: u32) {
        self.coins = value;
        self.dirty = true;
    }
}

fn add_stat(value: u8, gain: u8) -> u8 {
    value.saturating_add(gain).min(STAT_MAX)
}

fn clamp_stat(raw: i32) -> u8 {
    u8::try_from(raw.clamp(0, i32::from(STAT_MAX))).unwrap_or(STAT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        map: HashMap<String, std::vec::Vec<u8>>,
    }

    impl StoragePort for MemStore {
        fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
            let v = self.map.get(&format!("{ns}::{key}")).ok_or(StorageError::NotFound)?;
            let n = v.len().min(buf.len());
            buf[..n].copy_from_slice(&v[..n]);
            Ok(n)
        }
        fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
            self.map.insert(format!("{ns}::{key}"), data.to_vec());
            Ok(())
        }
        fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
            self.map.remove(&format!("{ns}::{key}"));
            Ok(())
        }
        fn exists(&self, ns: &str, key: &str) -> bool {
            self.map.contains_key(&format!("{ns}::{key}"))
        }
    }

    fn pet() -> PetModel {
        let mut p = PetModel::new(&PetConfig::default());
        p.begin(0);
        p
    }

    // ── Feeding ──────────────────────────────────────────────────

    #[test]
    fn feed_without_coins_raises_insufficient() {
        let mut p = pet();
        assert!(!p.feed(0));
        assert!(p.is_short_of_coins(0));
        assert_eq!(p.hunger(), 100);
    }

    #[test]
    fn feed_when_full_makes_pet_angry() {
        let mut p = pet();
        p.add_coins(10);
        assert!(!p.feed(0));
        assert!(p.is_angry(0));
        assert_eq!(p.coins(), 10);
    }

    #[test]
    fn feed_applies_costs_and_cheers() {
        let mut p = pet();
        p.add_coins(15);
        p.set_hunger(50);
        assert!(p.feed(100));
        assert_eq!(p.coins(), 5);
        assert_eq!(p.hunger(), 70);
        assert_eq!(p.sleepiness(), 95);
        assert_eq!(p.mood(100), Mood::Happy);
    }

    #[test]
    fn feed_refused_while_asleep() {
        let mut p = pet();
        p.set_sleepiness(10);
        assert!(p.sleep(0));
        p.add_coins(50);
        assert!(!p.feed(0));
        assert!(!p.is_short_of_coins(0));
    }

    // ── Sleep / wake ─────────────────────────────────────────────

    #[test]
    fn sleep_refused_when_rested() {
        let mut p = pet();
        assert!(!p.sleep(0));
        assert!(p.is_angry(0));
        assert!(!p.is_sleeping());
    }

    #[test]
    fn sleep_and_wake_are_idempotent() {
        let mut p = pet();
        assert!(!p.wake_up(0));
        assert_eq!(p.boredom(), 100);

        p.set_sleepiness(15);
        assert!(p.sleep(0));
        assert!(!p.sleep(10));
        assert!(p.is_sleeping());
        assert_eq!(
            p.drain_signals().as_slice(),
            &[PetSignal::FellAsleep]
        );
    }

    #[test]
    fn early_wake_is_grumpy_and_keeps_sleepiness() {
        let mut p = pet();
        p.set_sleepiness(10);
        p.set_boredom(50);
        p.set_hunger(50);
        assert!(p.sleep(0));
        assert!(p.wake_up(1_000));
        assert!(p.is_angry(1_000));
        assert_eq!(p.sleepiness(), 10);
        assert_eq!(p.boredom(), 70);
        assert_eq!(p.hunger(), 35);
    }

    #[test]
    fn sleeping_pet_recovers_and_wakes_at_full() {
        let mut p = pet();
        p.set_sleepiness(18);
        assert!(p.sleep(0));
        p.set_sleepiness(98);
        p.tick(5_000);
        assert_eq!(p.sleepiness(), 99);
        assert!(p.is_sleeping());
        p.tick(10_000);
        assert_eq!(p.sleepiness(), 100);
        assert!(!p.is_sleeping());
        assert!(!p.is_angry(10_000));
    }

    // ── Decay ────────────────────────────────────────────────────

    #[test]
    fn decay_applies_once_per_minute() {
        let mut p = pet();
        p.tick(59_999);
        assert_eq!(p.hunger(), 100);
        p.tick(60_000);
        assert_eq!((p.hunger(), p.boredom(), p.sleepiness()), (96, 98, 99));
        p.tick(180_000);
        assert_eq!((p.hunger(), p.boredom(), p.sleepiness()), (88, 94, 97));
    }

    #[test]
    fn sleepiness_divider_slows_tiredness() {
        let cfg = PetConfig {
            sleepiness_decay_divider: 2,
            ..PetConfig::default()
        };
        let mut p = PetModel::new(&cfg);
        p.begin(0);
        p.tick(60_000);
        assert_eq!(p.sleepiness(), 100);
        p.tick(120_000);
        assert_eq!(p.sleepiness(), 99);
    }

    #[test]
    fn exhausted_pet_falls_asleep() {
        let mut p = pet();
        p.set_sleepiness(1);
        p.tick(60_000);
        assert_eq!(p.sleepiness(), 0);
        assert!(p.is_sleeping());
    }

    #[test]
    fn low_stat_signal_is_edge_triggered() {
        let mut p = pet();
        p.set_hunger(24);
        p.tick(60_000);
        assert_eq!(p.hunger(), 20);
        assert_eq!(
            p.drain_signals().as_slice(),
            &[PetSignal::LowStat(Stat::Hunger)]
        );
        p.tick(120_000);
        assert!(p.drain_signals().is_empty());

        p.set_hunger(50);
        p.tick(120_001);
        p.set_hunger(10);
        p.tick(120_002);
        assert_eq!(
            p.drain_signals().as_slice(),
            &[PetSignal::LowStat(Stat::Hunger)]
        );
    }

    // ── Flags ────────────────────────────────────────────────────

    #[test]
    fn flags_expire_after_duration() {
        let mut p = pet();
        p.feed(1_000);
        assert_eq!(p.overlay(3_999), Some(Overlay::InsufficientCoins));
        p.tick(4_000);
        assert_eq!(p.overlay(4_000), None);
    }

    #[test]
    fn overlay_precedence() {
        let mut p = pet();
        p.feed(0); // insufficient
        p.add_coins(30);
        p.buy_food(FoodKind::Apple, 0); // happy
        assert_eq!(p.overlay(0), Some(Overlay::Happy));
        p.sleep(0); // angry, pet is rested
        assert_eq!(p.overlay(0), Some(Overlay::Angry));
    }

    // ── Shop ─────────────────────────────────────────────────────

    #[test]
    fn buy_food_clamps_hunger() {
        let mut p = pet();
        p.set_hunger(90);
        p.add_coins(25);
        assert!(p.buy_food(FoodKind::Cake, 0));
        assert_eq!(p.hunger(), 100);
        assert_eq!(p.coins(), 0);
    }

    #[test]
    fn unaffordable_food_only_sets_flag() {
        let mut p = pet();
        p.set_hunger(30);
        p.add_coins(14);
        assert!(!p.buy_food(FoodKind::Bread, 0));
        assert_eq!(p.hunger(), 30);
        assert_eq!(p.coins(), 14);
        assert!(p.is_short_of_coins(0));
    }

    #[test]
    fn unlocks_are_one_time() {
        let mut p = pet();
        p.add_coins(200);
        assert!(p.buy_memory_game(0));
        assert!(!p.buy_memory_game(0));
        assert!(p.buy_tictactoe_game(0));
        assert!(!p.buy_tictactoe_game(0));
        assert_eq!(p.coins(), 50);
        assert!(p.memory_unlocked() && p.tictactoe_unlocked());
    }

    // ── Persistence ──────────────────────────────────────────────

    #[test]
    fn save_then_load_roundtrips() {
        let mut store = MemStore::default();
        let mut p = pet();
        p.set_hunger(42);
        p.set_boredom(17);
        p.set_sleepiness(9);
        p.set_coins(123);
        p.sleep(0);
        p.save(&mut store).unwrap();
        assert!(!p.is_dirty());

        let back = PetModel::load(&store, &PetConfig::default());
        assert_eq!(
            (back.hunger(), back.boredom(), back.sleepiness(), back.coins()),
            (42, 17, 9, 123)
        );
        assert!(back.is_sleeping());
    }

    #[test]
    fn boot_wakes_a_sleeping_pet_without_penalty() {
        let mut store = MemStore::default();
        store.put_bool(NAMESPACE, KEY_SLEEPING, true).unwrap();
        store.put_int(NAMESPACE, KEY_SLEEPINESS, 10).unwrap();
        let mut p = PetModel::load(&store, &PetConfig::default());
        p.begin(0);
        assert!(!p.is_sleeping());
        assert!(!p.is_angry(0));
        assert_eq!(p.boredom(), 100);
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let mut store = MemStore::default();
        store.put_int(NAMESPACE, KEY_HUNGER, 250).unwrap();
        store.put_int(NAMESPACE, KEY_BOREDOM, -5).unwrap();
        store.put_int(NAMESPACE, KEY_COINS, -1).unwrap();
        let p = PetModel::load(&store, &PetConfig::default());
        assert_eq!(p.hunger(), 100);
        assert_eq!(p.boredom(), 0);
        assert_eq!(p.coins(), 0);
    }

    #[test]
    fn save_skips_clean_model() {
        let mut store = MemStore::default();
        let mut p = pet();
        p.save(&mut store).unwrap();
        assert!(!store.exists(NAMESPACE, KEY_HUNGER));
    }
}
