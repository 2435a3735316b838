//! Port traits: the hexagonal boundary between the pet engine and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppController (domain)
//! ```
//!
//! Driven adapters (clock, storage, audio, event sinks) implement these
//! traits.  The [`AppController`](super::controller::AppController) consumes
//! them via generics, so the engine never touches hardware directly.
//!
//! The engine never draws: renderers pull a
//! [`Snapshot`](super::snapshot::Snapshot) instead of being driven by a port.

use log::warn;

use crate::config::PetConfig;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter.  Never decreases.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Audio port (driven adapter: domain → buzzer)
// ───────────────────────────────────────────────────────────────

/// The engine requests named cues; nothing in the engine waits for them.
pub trait AudioPort {
    fn play(&mut self, cue: super::events::AudioCue);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The engine emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the engine configuration.
///
/// Implementations MUST validate values before persisting and reject
/// out-of-range fields with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`PetConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<PetConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &PetConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage, namespaced per engine
/// (`"tamagotchi"`, `"tictactoe"`).
///
/// Adapters implement the four raw byte operations; the typed
/// `get_*`/`put_*` helpers are provided on top.  Typed reads never fail:
/// a missing or unreadable key yields the caller's default.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;

    /// Read a little-endian `i32`, falling back to `default`.
    fn get_int(&self, namespace: &str, key: &str, default: i32) -> i32 {
        let mut buf = [0u8; 4];
        match self.read(namespace, key, &mut buf) {
            Ok(4) => i32::from_le_bytes(buf),
            Ok(n) => {
                warn!("{}::{} holds {} bytes, expected 4; using default", namespace, key, n);
                default
            }
            Err(StorageError::NotFound) => default,
            Err(e) => {
                warn!("{}::{} read failed ({}); using default", namespace, key, e);
                default
            }
        }
    }

    /// Read a one-byte boolean, falling back to `default`.
    fn get_bool(&self, namespace: &str, key: &str, default: bool) -> bool {
        let mut buf = [0u8; 1];
        match self.read(namespace, key, &mut buf) {
            Ok(1) => buf[0] != 0,
            Ok(_) | Err(StorageError::NotFound) => default,
            Err(e) => {
                warn!("{}::{} read failed ({}); using default", namespace, key, e);
                default
            }
        }
    }

    fn put_int(&mut self, namespace: &str, key: &str, value: i32) -> Result<(), StorageError> {
        self.write(namespace, key, &value.to_le_bytes())
    }

    fn put_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError> {
        self.write(namespace, key, &[u8::from(value)])
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
