//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] on an in-memory
//! key-value map that mirrors the flash NVS layout: every key lives under
//! a namespace (`"tamagotchi"`, `"tictactoe"`, `"pocketpet"` for the config
//! blob).
//!
//! - Config validation: all fields are range-checked before persistence.
//! - Namespace isolation: keys are stored as `"namespace::key"`.
//! - The whole store can be exported to / imported from JSON so the host
//!   simulator keeps its pet between runs.
//! - An optional entry limit makes writes fail with [`StorageError::Full`],
//!   which is how tests exercise the storage-failure paths.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::PetConfig;

const CONFIG_NAMESPACE: &str = "pocketpet";
const CONFIG_KEY: &str = "petcfg";

const MAX_BLOB_SIZE: usize = 4000;

type Store = BTreeMap<String, Vec<u8>>;

pub struct NvsAdapter {
    store: RefCell<Store>,
    /// Maximum number of entries; `None` = unbounded.
    capacity: Option<usize>,
}

impl Default for NvsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NvsAdapter {
    pub fn new() -> Self {
        info!("NvsAdapter: simulation backend");
        Self {
            store: RefCell::new(Store::new()),
            capacity: None,
        }
    }

    /// A store that refuses new keys once it holds `max_entries`.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            store: RefCell::new(Store::new()),
            capacity: Some(max_entries),
        }
    }

    /// Rebuild a store from [`export_json`](Self::export_json) output.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let map: Store = serde_json::from_str(json).map_err(|e| {
            warn!("NvsAdapter: unreadable store image: {}", e);
            StorageError::IoError
        })?;
        info!("NvsAdapter: restored {} entries", map.len());
        Ok(Self {
            store: RefCell::new(map),
            capacity: None,
        })
    }

    pub fn export_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(&*self.store.borrow()).map_err(|_| StorageError::IoError)
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    fn insert(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(StorageError::Full);
        }
        let composite = Self::composite_key(namespace, key);
        let mut store = self.store.borrow_mut();
        if let Some(cap) = self.capacity {
            if !store.contains_key(&composite) && store.len() >= cap {
                return Err(StorageError::Full);
            }
        }
        store.insert(composite, data.to_vec());
        Ok(())
    }
}

fn validate_config(cfg: &PetConfig) -> Result<(), ConfigError> {
    if !(1_000..=3_600_000).contains(&cfg.decay_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "decay_interval_ms must be 1000–3600000",
        ));
    }
    if !(1..=10).contains(&cfg.sleepiness_decay_divider) {
        return Err(ConfigError::ValidationFailed(
            "sleepiness_decay_divider must be 1–10",
        ));
    }
    if !(100..=600_000).contains(&cfg.sleep_recovery_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "sleep_recovery_interval_ms must be 100–600000",
        ));
    }
    if !(100..=30_000).contains(&cfg.flag_duration_ms) {
        return Err(ConfigError::ValidationFailed(
            "flag_duration_ms must be 100–30000",
        ));
    }
    if !(100..=5_000).contains(&cfg.long_press_ms) {
        return Err(ConfigError::ValidationFailed(
            "long_press_ms must be 100–5000",
        ));
    }
    if !(50..=5_000).contains(&cfg.dash_threshold_ms) {
        return Err(ConfigError::ValidationFailed(
            "dash_threshold_ms must be 50–5000",
        ));
    }
    if !(1_000..=60_000).contains(&cfg.menu_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "menu_timeout_ms must be 1000–60000",
        ));
    }
    if cfg.game_result_hold_ms > 30_000 {
        return Err(ConfigError::ValidationFailed(
            "game_result_hold_ms must be 0–30000",
        ));
    }
    if cfg.pet_move_delay_ms > 10_000 {
        return Err(ConfigError::ValidationFailed(
            "pet_move_delay_ms must be 0–10000",
        ));
    }
    if cfg.block_chance_percent > 100 {
        return Err(ConfigError::ValidationFailed(
            "block_chance_percent must be 0–100",
        ));
    }
    for hold in [cfg.test_chord_ms, cfg.restore_hold_ms, cfg.coin_hold_ms] {
        if !(1_000..=10_000).contains(&hold) {
            return Err(ConfigError::ValidationFailed(
                "test-mode hold times must be 1000–10000",
            ));
        }
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<PetConfig, ConfigError> {
        let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
        if let Some(bytes) = self.store.borrow().get(&key) {
            let cfg: PetConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
            info!("NvsAdapter: loaded config from store");
            Ok(cfg)
        } else {
            info!("NvsAdapter: no stored config, using defaults");
            Ok(PetConfig::default())
        }
    }

    fn save(&self, config: &PetConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.insert(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let composite = Self::composite_key(namespace, key);
        match self.store.borrow().get(&composite) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.insert(namespace, key, data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        self.store.borrow_mut().remove(&composite);
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        let composite = Self::composite_key(namespace, key);
        self.store.borrow().contains_key(&composite)
    }
}
