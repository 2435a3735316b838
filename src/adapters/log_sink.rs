//! Log-based event sink and audio adapter.
//!
//! Implements [`EventSink`] and [`AudioPort`] by writing structured lines
//! to the `log` facade.  On the host simulator that ends up on stderr via
//! `env_logger`; a buzzer driver would implement [`AudioPort`] instead.

use log::{debug, info};

use crate::app::events::{AppEvent, AudioCue};
use crate::app::ports::{AudioPort, EventSink};

/// Adapter that logs every [`AppEvent`] and [`AudioCue`].
#[derive(Debug, Default)]
pub struct LogSink {
    emitted: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted += 1;
        match event {
            AppEvent::Started(mode) => info!("START | mode={:?}", mode),
            AppEvent::ModeChanged { from, to } => info!("MODE  | {:?} -> {:?}", from, to),
            AppEvent::LowStat(stat) => info!("LOW   | {}", stat.name()),
            AppEvent::FellAsleep => info!("SLEEP | fell asleep"),
            AppEvent::WokeUp => info!("SLEEP | woke up"),
            AppEvent::Purchased(item) => info!("SHOP  | bought {}", item.label()),
            AppEvent::PurchaseRejected(item) => info!("SHOP  | refused {}", item.label()),
            AppEvent::GameFinished(summary) => info!(
                "GAME  | {} {:?} +{} coins",
                summary.kind.name(),
                summary.outcome,
                summary.coins
            ),
            AppEvent::OverlayShown(overlay) => info!("SHOW  | {:?}", overlay),
            AppEvent::TestModeChanged(on) => info!("TEST  | test mode {}", if *on { "on" } else { "off" }),
        }
    }
}

impl AudioPort for LogSink {
    fn play(&mut self, cue: AudioCue) {
        debug!("AUDIO | {}", cue.name());
    }
}
