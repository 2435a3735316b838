//! PocketPet host simulator.
//!
//! Drives the engine from a line script on stdin and prints JSON
//! snapshots on stdout.  Logs go to stderr through `env_logger`
//! (`RUST_LOG=debug` shows ignored input and the heartbeat line).
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  SimPin ×3 ─▶ ButtonSampler ─▶ EventQueue                  │
//! │  ManualClock (ClockPort)   NvsAdapter (Config+Storage)     │
//! │  LogSink (EventSink + AudioPort)                           │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ──────────────       │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │            AppController (pure logic)            │      │
//! │  │  FSM · Pet · Dodge · Memory · TicTacToe          │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Script lines:
//!
//! | Line                     | Effect                                   |
//! |--------------------------|------------------------------------------|
//! | `press <buttons> [ms]`   | hold (default 100 ms), then release      |
//! | `long <button>`          | hold past the long-press threshold       |
//! | `wait <ms>`              | let time pass                            |
//! | `snap`                   | print a JSON snapshot                    |
//! | `cmd <command>`          | debug command (needs test mode)          |
//!
//! `<buttons>` is one name or several joined with `+`; holding
//! `left+action+right` for 3 s toggles test mode like on the device.
//! | `# ...`                  | comment                                  |
//!
//! Flags: `--seed N`, `--state FILE` (load/save the store as JSON),
//! `--test-mode`.

use std::cell::Cell;
use std::convert::Infallible;
use std::io::BufRead;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

use pocketpet::adapters::log_sink::LogSink;
use pocketpet::adapters::nvs::NvsAdapter;
use pocketpet::adapters::time::ManualClock;
use pocketpet::app::commands::AppCommand;
use pocketpet::app::controller::AppController;
use pocketpet::app::ports::{ClockPort, ConfigPort};
use pocketpet::config::PetConfig;
use pocketpet::drivers::button::ButtonSampler;
use pocketpet::error::Error;
use pocketpet::events::{ButtonId, EventQueue};

/// Simulation step.  Buttons are sampled and the engine ticked once per step.
const STEP_MS: u64 = 10;
const DEFAULT_PRESS_MS: u64 = 100;

// ── Simulated pin ─────────────────────────────────────────────

/// Active-low pin whose level the script sets.
#[derive(Clone, Default)]
struct SimPin {
    low: Rc<Cell<bool>>,
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.low.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.low.get())
    }
}

// ── Options ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Options {
    seed: Option<u64>,
    state_file: Option<String>,
    test_mode: bool,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                opts.seed = Some(value.parse().context("--seed must be an integer")?);
            }
            "--state" => {
                opts.state_file = Some(args.next().context("--state needs a path")?);
            }
            "--test-mode" => opts.test_mode = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(opts)
}

// ── Simulator ─────────────────────────────────────────────────

struct Simulator {
    clock: ManualClock,
    controller: AppController,
    nvs: NvsAdapter,
    sink: LogSink,
    queue: EventQueue,
    levels: [Rc<Cell<bool>>; 3],
    samplers: [ButtonSampler<SimPin>; 3],
    long_press_ms: u64,
}

impl Simulator {
    fn new(config: PetConfig, seed: u64, nvs: NvsAdapter) -> Self {
        let pins: [SimPin; 3] = Default::default();
        let levels = [pins[0].low.clone(), pins[1].low.clone(), pins[2].low.clone()];
        let [left, action, right] = pins;
        let samplers = [
            ButtonSampler::new(ButtonId::Left, left),
            ButtonSampler::new(ButtonId::Action, action),
            ButtonSampler::new(ButtonId::Right, right),
        ];

        let long_press_ms = u64::from(config.long_press_ms);
        let mut controller = AppController::new(config, seed);
        controller.load(&nvs);

        let clock = ManualClock::new(0);
        let mut sink = LogSink::new();
        controller.start(clock.now_ms(), &mut sink);

        Self {
            clock,
            controller,
            nvs,
            sink,
            queue: EventQueue::new(),
            levels,
            samplers,
            long_press_ms,
        }
    }

    fn step(&mut self) {
        self.clock.advance(STEP_MS);
        let now = self.clock.now_ms();
        for sampler in &mut self.samplers {
            if let Some(event) = sampler.poll(now) {
                self.queue.push(event);
            }
        }
        while let Some(event) = self.queue.pop() {
            self.controller
                .handle_input(event, now, &mut self.nvs, &mut self.sink);
        }
        self.controller.tick(now, &mut self.nvs, &mut self.sink);
    }

    fn run_for(&mut self, ms: u64) {
        for _ in 0..ms.div_ceil(STEP_MS) {
            self.step();
        }
    }

    fn press(&mut self, buttons: &[ButtonId], held_ms: u64) {
        for &button in buttons {
            self.levels[button_index(button)].set(true);
        }
        self.run_for(held_ms);
        for &button in buttons {
            self.levels[button_index(button)].set(false);
        }
        // Let the release debounce settle.
        self.run_for(STEP_MS * 6);
    }

    fn run_line(&mut self, line: &str) -> Result<(), Error> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match verb {
            "press" => {
                let mut words = rest.split_whitespace();
                let names = words
                    .next()
                    .ok_or(Error::Input("press needs left, action or right"))?;
                let buttons = names
                    .split('+')
                    .map(|name| ButtonId::from_name(name).ok_or(Error::Input("unknown button")))
                    .collect::<Result<Vec<_>, _>>()?;
                let held = match words.next() {
                    Some(ms) => ms.parse().map_err(|_| Error::Input("bad hold time"))?,
                    None => DEFAULT_PRESS_MS,
                };
                self.press(&buttons, held);
            }
            "long" => {
                let button =
                    ButtonId::from_name(rest).ok_or(Error::Input("long needs a button"))?;
                self.press(&[button], self.long_press_ms + 100);
            }
            "wait" => {
                let ms: u64 = rest.parse().map_err(|_| Error::Input("bad wait time"))?;
                self.run_for(ms);
            }
            "snap" => {
                let snap = self.controller.snapshot();
                match serde_json::to_string(&snap) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!("snapshot encode failed: {}", e),
                }
            }
            "cmd" => {
                let cmd = AppCommand::parse(rest).ok_or(Error::Input("unknown command"))?;
                let now = self.clock.now_ms();
                self.controller
                    .handle_command(cmd, now, &mut self.nvs, &mut self.sink)?;
            }
            _ => return Err(Error::Input("unknown script verb")),
        }
        Ok(())
    }
}

fn button_index(button: ButtonId) -> usize {
    match button {
        ButtonId::Left => 0,
        ButtonId::Action => 1,
        ButtonId::Right => 2,
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("PocketPet simulator v{}", env!("CARGO_PKG_VERSION"));

    let opts = parse_args()?;

    // ── Store and config ──────────────────────────────────────
    let nvs = match &opts.state_file {
        Some(path) if std::path::Path::new(path).exists() => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading state file {path}"))?;
            NvsAdapter::from_json(&json).map_err(Error::from)?
        }
        _ => NvsAdapter::new(),
    };
    let mut config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config load failed ({}), using defaults", e);
            PetConfig::default()
        }
    };
    if opts.test_mode {
        config.test_mode = true;
    }

    let seed = opts.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0x5eed)
    });
    info!("seed={}", seed);

    // ── Script loop ───────────────────────────────────────────
    let mut sim = Simulator::new(config, seed, nvs);
    let stdin = std::io::stdin();
    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading script")?;
        if let Err(e) = sim.run_line(&line) {
            warn!("line {}: {} ({})", n + 1, e, line.trim());
        }
    }

    info!(
        "script done at {} ms, {} events emitted",
        sim.clock.now_ms(),
        sim.sink.emitted()
    );

    if let Some(path) = &opts.state_file {
        let json = sim.nvs.export_json().map_err(|e| anyhow!("export failed: {e}"))?;
        std::fs::write(path, json).with_context(|| format!("writing state file {path}"))?;
        info!("state saved to {}", path);
    }
    Ok(())
}
