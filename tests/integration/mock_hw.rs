//! Mock adapters and a small test rig for integration tests.
//!
//! `MockNvs` is an in-memory store with switchable write failures;
//! `Recorder` keeps every audio cue and app event so tests can assert on
//! the full history.  `Rig` bundles them with an `AppController` and a
//! millisecond clock.

use std::collections::HashMap;

use pocketpet::app::commands::AppCommand;
use pocketpet::app::controller::AppController;
use pocketpet::app::events::{AppEvent, AudioCue};
use pocketpet::app::ports::{AudioPort, EventSink, StorageError, StoragePort};
use pocketpet::config::PetConfig;
use pocketpet::events::{ButtonId, InputEvent};

/// Simulation step used by [`Rig::wait`].
pub const STEP_MS: u64 = 10;

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let k = format!("{}::{}", namespace, key);
        match self.store.get(&k) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.store.insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── Recorder ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Recorder {
    pub cues: Vec<AudioCue>,
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn count_cue(&self, cue: AudioCue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }

    pub fn saw(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl AudioPort for Recorder {
    fn play(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub struct Rig {
    pub app: AppController,
    pub nvs: MockNvs,
    pub out: Recorder,
    pub now: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: PetConfig) -> Self {
        Self::with_store(config, MockNvs::new())
    }

    /// Debug commands enabled.
    pub fn test_mode() -> Self {
        Self::new(PetConfig {
            test_mode: true,
            ..PetConfig::default()
        })
    }

    /// Boot a controller from whatever `nvs` holds.
    pub fn with_store(config: PetConfig, nvs: MockNvs) -> Self {
        let mut app = AppController::new(config, 0xC0FFEE);
        app.load(&nvs);
        let mut out = Recorder::default();
        app.start(0, &mut out);
        Self {
            app,
            nvs,
            out,
            now: 0,
        }
    }

    /// Down, then up `held_ms` later.  No ticks run in between.
    pub fn press(&mut self, button: ButtonId, held_ms: u32) {
        self.app
            .handle_input(InputEvent::ButtonDown(button), self.now, &mut self.nvs, &mut self.out);
        self.now += u64::from(held_ms);
        self.app.handle_input(
            InputEvent::ButtonUp(button, held_ms),
            self.now,
            &mut self.nvs,
            &mut self.out,
        );
    }

    /// Hold `buttons` together for `held_ms`, ticking throughout, then
    /// release them in order.
    pub fn hold(&mut self, buttons: &[ButtonId], held_ms: u32) {
        for &button in buttons {
            self.app
                .handle_input(InputEvent::ButtonDown(button), self.now, &mut self.nvs, &mut self.out);
        }
        self.wait(u64::from(held_ms));
        for &button in buttons {
            self.app.handle_input(
                InputEvent::ButtonUp(button, held_ms),
                self.now,
                &mut self.nvs,
                &mut self.out,
            );
        }
    }

    pub fn tap(&mut self, button: ButtonId) {
        self.press(button, 80);
    }

    pub fn long(&mut self, button: ButtonId) {
        self.press(button, 700);
    }

    /// Let `ms` pass, ticking every [`STEP_MS`].
    pub fn wait(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.now = (self.now + STEP_MS).min(end);
            self.app.tick(self.now, &mut self.nvs, &mut self.out);
        }
    }

    pub fn cmd(&mut self, cmd: AppCommand) {
        self.app
            .handle_command(cmd, self.now, &mut self.nvs, &mut self.out)
            .expect("test mode enabled");
    }

    /// Main view → main menu → commit the item at `index`.
    pub fn main_menu_commit(&mut self, index: usize) {
        self.tap(ButtonId::Action);
        for _ in 0..index {
            self.tap(ButtonId::Right);
        }
        self.long(ButtonId::Action);
    }
}
