//! Outbound application events and audio cues.
//!
//! The [`AppController`](super::controller::AppController) emits these
//! through the [`EventSink`](super::ports::EventSink) and
//! [`AudioPort`](super::ports::AudioPort) ports.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::app::snapshot::{Mode, Overlay};
use crate::games::GameSummary;
use crate::pet::Stat;
use crate::pet::shop::ShopItem;

/// Structured events emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AppEvent {
    /// The controller has started (carries the initial mode).
    Started(Mode),

    /// The visible mode changed.
    ModeChanged { from: Mode, to: Mode },

    /// A stat dropped to the low threshold (edge-triggered).
    LowStat(Stat),

    /// The pet fell asleep.
    FellAsleep,

    /// The pet woke up.
    WokeUp,

    /// A shop purchase went through.
    Purchased(ShopItem),

    /// A shop purchase was refused.
    PurchaseRejected(ShopItem),

    /// A mini-game finished and paid out.
    GameFinished(GameSummary),

    /// A modal overlay appeared.
    OverlayShown(Overlay),

    /// Test mode switched on (`true`) or off.
    TestModeChanged(bool),
}

/// Named buzzer cues.  Playback is fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioCue {
    Beep,
    Happy,
    Angry,
    Error,
    Dot,
    Dash,
}

impl AudioCue {
    pub fn name(self) -> &'static str {
        match self {
            Self::Beep => "beep",
            Self::Happy => "happy",
            Self::Angry => "angry",
            Self::Error => "error",
            Self::Dot => "dot",
            Self::Dash => "dash",
        }
    }
}
