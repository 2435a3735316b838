//! Application controller: the hexagonal core.
//!
//! [`AppController`] owns the mode FSM and the shared context (pet plus
//! game engines).  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, so the whole engine runs
//! under test with mock adapters.
//!
//! ```text
//!  InputEvent ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                 │      AppController      │
//!  tick(now)  ──▶ │  FSM · Pet · Games      │ ──▶ AudioPort
//!                 └────────────┬────────────┘
//!                              ▼
//!                         StoragePort
//! ```
//!
//! Every entry point is one "poll step": route, update, then flush pet
//! signals, persistence, overlay cues and mode-change events before
//! returning.
//!
//! Hold gestures are checked on every tick while the buttons are still
//! down: all three buttons for `test_chord_ms` toggle test mode; in test
//! mode a lone hold in the main view refills a stat (Left hunger, Action
//! boredom, Right sleepiness) and a lone Left/Right hold in the shop sets
//! the coins to 0/50.

use log::{debug, info};

use crate::config::PetConfig;
use crate::error::{Error, Result};
use crate::events::{ButtonId, InputEvent, Press};
use crate::fsm::context::AppContext;
use crate::fsm::states::build_mode_table;
use crate::fsm::{Fsm, ModeId};
use crate::games::dodge::DodgeGame;
use crate::games::memory::MemoryGame;
use crate::games::tictactoe::TicTacToeGame;
use crate::pet::{Overlay, PetModel, PetSignal, STAT_MAX};

use super::commands::AppCommand;
use super::events::{AppEvent, AudioCue};
use super::gestures::HoldTracker;
use super::ports::{AudioPort, EventSink, StoragePort};
use super::snapshot::{Mode, Snapshot};

/// Balance granted by the shop's Right hold in test mode.
const TEST_COINS: u32 = 50;

// ───────────────────────────────────────────────────────────────
// AppController
// ───────────────────────────────────────────────────────────────

pub struct AppController {
    fsm: Fsm,
    ctx: AppContext,
    holds: HoldTracker,
    /// Mode reported by the last completed step.
    last_mode: Mode,
    last_overlay: Option<Overlay>,
    last_heartbeat_at: u64,
}

impl AppController {
    /// Construct the controller with a fresh pet.
    ///
    /// Does **not** start the FSM; call [`load`](Self::load) (optional) and
    /// then [`start`](Self::start).
    pub fn new(config: PetConfig, seed: u64) -> Self {
        let ctx = AppContext::new(config, seed);
        let fsm = Fsm::new(build_mode_table(), ModeId::MainView);
        Self {
            fsm,
            ctx,
            holds: HoldTracker::new(),
            last_mode: Mode::MainView,
            last_overlay: None,
            last_heartbeat_at: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore the pet and the game records from storage.
    pub fn load(&mut self, store: &impl StoragePort) {
        self.ctx.load(store);
    }

    /// Anchor every timer at `now` and enter the main view.
    pub fn start(&mut self, now: u64, out: &mut (impl AudioPort + EventSink)) {
        self.ctx.now = now;
        self.ctx.pet.begin(now);
        self.fsm.start(&mut self.ctx);
        self.last_heartbeat_at = now;
        self.last_overlay = self.ctx.pet.overlay(now);
        self.last_mode = self.mode();
        out.emit(&AppEvent::Started(self.last_mode));
        info!("AppController started in {:?}", self.last_mode);
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Advance time: pet decay, flag expiry, game updates and mode timers.
    pub fn tick(
        &mut self,
        now: u64,
        store: &mut impl StoragePort,
        out: &mut (impl AudioPort + EventSink),
    ) {
        self.set_now(now);
        self.check_holds();
        self.ctx.pet.tick(self.ctx.now);
        self.fsm.tick(&mut self.ctx);
        self.finish_step(store, out);
    }

    /// Route one input edge.  Overlays swallow everything, and so do
    /// releases that end a hold gesture.
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        now: u64,
        store: &mut impl StoragePort,
        out: &mut (impl AudioPort + EventSink),
    ) {
        self.set_now(now);
        match event {
            InputEvent::ButtonDown(button) => self.holds.on_down(button, self.ctx.now),
            InputEvent::ButtonUp(button, _) => {
                if self.holds.on_up(button, self.ctx.now) {
                    debug!("{:?} release ends a hold gesture, not routed", button);
                    return;
                }
            }
        }
        if let Some(overlay) = self.ctx.pet.overlay(self.ctx.now) {
            debug!("{:?} swallowed by {:?} overlay", event, overlay);
            return;
        }
        match event {
            InputEvent::ButtonDown(_) => self.fsm.button_down(&mut self.ctx),
            InputEvent::ButtonUp(button, held_ms) => {
                let press = Press::new(button, held_ms, self.ctx.config.long_press_ms);
                debug!("{:?} in {}", press, self.fsm.current_name());
                self.fsm.press(press, &mut self.ctx);
            }
        }
        self.finish_step(store, out);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a debug command.  Refused unless `test_mode` is on.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: u64,
        store: &mut impl StoragePort,
        out: &mut (impl AudioPort + EventSink),
    ) -> Result<()> {
        if !self.ctx.test_mode {
            return Err(Error::Input("debug commands require test mode"));
        }
        self.set_now(now);
        info!("debug command: {:?}", cmd);
        self.apply_command(cmd);
        self.finish_step(store, out);
        Ok(())
    }

    fn apply_command(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::RestoreHunger => self.ctx.pet.set_hunger(STAT_MAX),
            AppCommand::RestoreBoredom => self.ctx.pet.set_boredom(STAT_MAX),
            AppCommand::RestoreSleepiness => self.ctx.pet.set_sleepiness(STAT_MAX),
            AppCommand::SetCoins(coins) => self.ctx.pet.set_coins(coins),
            AppCommand::ForceMode(target) => self.fsm.force_transition(target, &mut self.ctx),
        }
    }

    // ── Hold gestures ─────────────────────────────────────────

    fn check_holds(&mut self) {
        let now = self.ctx.now;
        let PetConfig {
            test_chord_ms,
            restore_hold_ms,
            coin_hold_ms,
            ..
        } = self.ctx.config;
        if self.holds.chord(now, test_chord_ms) {
            let on = !self.ctx.test_mode;
            self.ctx.test_mode = on;
            info!("test mode {}", if on { "enabled" } else { "disabled" });
            // Two beeps to enable, one to disable.
            self.ctx.cue(AudioCue::Beep);
            if on {
                self.ctx.cue(AudioCue::Beep);
            }
            self.ctx.event(AppEvent::TestModeChanged(on));
            return;
        }
        if !self.ctx.test_mode || self.ctx.pet.overlay(now).is_some() {
            return;
        }

        let cmd = match self.fsm.current_mode() {
            ModeId::MainView => self
                .holds
                .solo(now, restore_hold_ms, &ButtonId::ALL)
                .map(|button| match button {
                    ButtonId::Left => AppCommand::RestoreHunger,
                    ButtonId::Action => AppCommand::RestoreBoredom,
                    ButtonId::Right => AppCommand::RestoreSleepiness,
                }),
            ModeId::ShopMenu => {
                let sides = [ButtonId::Left, ButtonId::Right];
                let cmd = self.holds.solo(now, coin_hold_ms, &sides).map(|button| {
                    if button == ButtonId::Left {
                        AppCommand::SetCoins(0)
                    } else {
                        AppCommand::SetCoins(TEST_COINS)
                    }
                });
                if cmd.is_some() {
                    self.ctx.menu_activity_at = now;
                }
                cmd
            }
            _ => None,
        };
        if let Some(cmd) = cmd {
            info!("test hold: {:?}", cmd);
            self.apply_command(cmd);
            self.ctx.cue(AudioCue::Beep);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// The mode as the user currently sees it.
    pub fn mode(&self) -> Mode {
        Mode::resolve(
            self.fsm.current_mode(),
            self.ctx.active_game,
            self.ctx.pet.overlay(self.ctx.now),
        )
    }

    /// The FSM mode underneath any overlay.
    pub fn mode_id(&self) -> ModeId {
        self.fsm.current_mode()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.ctx, self.fsm.current_mode())
    }

    pub fn pet(&self) -> &PetModel {
        &self.ctx.pet
    }

    pub fn dodge(&self) -> &DodgeGame {
        &self.ctx.dodge
    }

    pub fn memory(&self) -> &MemoryGame {
        &self.ctx.memory
    }

    pub fn tictactoe(&self) -> &TicTacToeGame {
        &self.ctx.tictactoe
    }

    pub fn config(&self) -> &PetConfig {
        &self.ctx.config
    }

    /// Debug shortcuts and commands are live.
    pub fn test_mode(&self) -> bool {
        self.ctx.test_mode
    }

    /// Time of the last processed step.
    pub fn now(&self) -> u64 {
        self.ctx.now
    }

    // ── Internal ──────────────────────────────────────────────

    /// Time never runs backwards inside the engine.
    fn set_now(&mut self, now: u64) {
        if now < self.ctx.now {
            debug!("clock went backwards ({} < {}), holding", now, self.ctx.now);
            return;
        }
        self.ctx.now = now;
    }

    fn finish_step(&mut self, store: &mut impl StoragePort, out: &mut (impl AudioPort + EventSink)) {
        let now = self.ctx.now;

        for signal in self.ctx.pet.drain_signals() {
            let event = match signal {
                PetSignal::LowStat(stat) => AppEvent::LowStat(stat),
                PetSignal::FellAsleep => AppEvent::FellAsleep,
                PetSignal::WokeUp => AppEvent::WokeUp,
            };
            self.ctx.event(event);
        }

        self.ctx.persist(store);

        let overlay = self.ctx.pet.overlay(now);
        if overlay != self.last_overlay {
            if let Some(o) = overlay {
                self.ctx.cue(overlay_cue(o));
                self.ctx.event(AppEvent::OverlayShown(o));
            }
            self.last_overlay = overlay;
        }

        let mode = self.mode();
        if mode != self.last_mode {
            self.ctx.event(AppEvent::ModeChanged {
                from: self.last_mode,
                to: mode,
            });
            self.last_mode = mode;
        }

        for cue in core::mem::take(&mut self.ctx.outbox.cues) {
            out.play(cue);
        }
        for event in core::mem::take(&mut self.ctx.outbox.events) {
            out.emit(&event);
        }

        let interval = u64::from(self.ctx.config.heartbeat_interval_ms);
        if interval > 0 && now.saturating_sub(self.last_heartbeat_at) >= interval {
            self.last_heartbeat_at = now;
            let pet = &self.ctx.pet;
            debug!(
                "[{}] hunger={} boredom={} sleepiness={} coins={} mood={:?} sleeping={}",
                self.fsm.current_name(),
                pet.hunger(),
                pet.boredom(),
                pet.sleepiness(),
                pet.coins(),
                pet.mood(now),
                pet.is_sleeping()
            );
        }
    }
}

fn overlay_cue(overlay: Overlay) -> AudioCue {
    match overlay {
        Overlay::Angry => AudioCue::Angry,
        Overlay::Happy => AudioCue::Happy,
        Overlay::InsufficientCoins => AudioCue::Error,
    }
}
