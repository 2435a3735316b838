//! Obstacle-dodge: survive boxes sliding down three lanes.
//!
//! Geometry is in screen pixels.  Obstacles enter at `x = GAME_WIDTH` and
//! slide left by `obstacle_speed` per update; the player sits at
//! `PLAYER_X`.  An obstacle that passes the player's column counts as
//! dodged, whatever lane it was in.

use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::app::ports::StoragePort;
use crate::pet::NAMESPACE;

pub const GAME_WIDTH: f32 = 128.0;
pub const NUM_LANES: u8 = 3;
pub const MAX_OBSTACLES: usize = 5;
pub const PLAYER_X: f32 = 10.0;
pub const PLAYER_WIDTH: f32 = 8.0;
pub const OBSTACLE_WIDTH: f32 = 8.0;
/// Obstacles further left than this are recycled.
const DESPAWN_X: f32 = -10.0;

const START_SPEED: f32 = 2.0;
const SPEED_STEP: f32 = 0.3;
const MAX_SPEED: f32 = 5.5;

const KEY_RECORD: &str = "gameRecord";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub x: f32,
    pub lane: u8,
    pub active: bool,
}

impl Obstacle {
    const IDLE: Self = Self {
        x: 0.0,
        lane: 0,
        active: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DodgePhase {
    Running,
    Collided,
}

/// Boxes to dodge before leaving `level`: 5, 7, 10, 14, …
pub fn boxes_required(level: u32) -> u32 {
    (level * level + level + 8) / 2
}

/// Milliseconds between spawn attempts at `level`.
pub fn spawn_interval_ms(level: u32) -> u64 {
    u64::from(1000u32.saturating_sub(level.saturating_mul(50)).max(200))
}

#[derive(Debug, Clone)]
pub struct DodgeGame {
    player_lane: u8,
    level: u32,
    score: u32,
    record: u32,
    obstacle_speed: f32,
    obstacles: [Obstacle; MAX_OBSTACLES],
    max_active: usize,
    dodged_this_level: u32,
    last_spawn_at: u64,
    phase: DodgePhase,
}

impl Default for DodgeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl DodgeGame {
    pub fn new() -> Self {
        Self {
            player_lane: 1,
            level: 1,
            score: 0,
            record: 0,
            obstacle_speed: START_SPEED,
            obstacles: [Obstacle::IDLE; MAX_OBSTACLES],
            max_active: 1,
            dodged_this_level: 0,
            last_spawn_at: 0,
            phase: DodgePhase::Running,
        }
    }

    pub fn load_record(&mut self, store: &impl StoragePort) {
        self.record = u32::try_from(store.get_int(NAMESPACE, KEY_RECORD, 0)).unwrap_or(0);
        debug!("dodge record: {}", self.record);
    }

    pub fn reset(&mut self, now: u64) {
        let record = self.record;
        *self = Self::new();
        self.record = record;
        self.last_spawn_at = now;
    }

    pub fn update(&mut self, now: u64, rng: &mut impl Rng) {
        if self.phase == DodgePhase::Collided {
            return;
        }

        if now.saturating_sub(self.last_spawn_at) >= spawn_interval_ms(self.level) {
            self.spawn(rng);
            self.last_spawn_at = now;
        }

        for i in 0..MAX_OBSTACLES {
            if !self.obstacles[i].active {
                continue;
            }
            let prev_x = self.obstacles[i].x;
            self.obstacles[i].x -= self.obstacle_speed;
            let x = self.obstacles[i].x;

            if prev_x > PLAYER_X && x <= PLAYER_X {
                self.record_dodge();
            }
            if x < DESPAWN_X {
                self.obstacles[i].active = false;
            }
        }

        if self.dodged_this_level >= boxes_required(self.level) {
            self.level_up();
        }

        if self.collides() {
            info!("dodge: collision at level {} (score {})", self.level, self.score);
            self.phase = DodgePhase::Collided;
        }
    }

    fn spawn(&mut self, rng: &mut impl Rng) {
        if self.active_count() >= self.max_active {
            return;
        }
        if let Some(slot) = self.obstacles.iter_mut().find(|o| !o.active) {
            *slot = Obstacle {
                x: GAME_WIDTH,
                lane: rng.random_range(0..NUM_LANES),
                active: true,
            };
        }
    }

    fn record_dodge(&mut self) {
        self.score = self.score.saturating_add(10 * self.level);
        self.dodged_this_level += 1;
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.dodged_this_level = 0;
        self.obstacle_speed = (self.obstacle_speed + SPEED_STEP).min(MAX_SPEED);
        self.max_active = MAX_OBSTACLES.min(self.level as usize);
        info!("dodge: level {} (speed {:.1})", self.level, self.obstacle_speed);
    }

    fn collides(&self) -> bool {
        self.obstacles.iter().any(|o| {
            o.active
                && o.lane == self.player_lane
                && o.x < PLAYER_X + PLAYER_WIDTH
                && o.x + OBSTACLE_WIDTH > PLAYER_X
        })
    }

    pub fn move_left(&mut self) {
        self.player_lane = self.player_lane.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.player_lane + 1 < NUM_LANES {
            self.player_lane += 1;
        }
    }

    pub fn cycle_lane(&mut self) {
        self.player_lane = (self.player_lane + 1) % NUM_LANES;
    }

    /// Close the round: store the level as the new record if it beats the
    /// old one.  Returns whether the record improved.
    pub fn finish(&mut self, store: &mut impl StoragePort) -> bool {
        if self.level <= self.record {
            return false;
        }
        self.record = self.level;
        let value = i32::try_from(self.record).unwrap_or(i32::MAX);
        if let Err(e) = store.put_int(NAMESPACE, KEY_RECORD, value) {
            warn!("dodge: failed to persist record: {}", e);
        }
        info!("dodge: new record {}", self.record);
        true
    }

    pub fn is_over(&self) -> bool {
        self.phase == DodgePhase::Collided
    }

    pub fn phase(&self) -> DodgePhase {
        self.phase
    }

    pub fn player_lane(&self) -> u8 {
        self.player_lane
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn obstacle_speed(&self) -> f32 {
        self.obstacle_speed
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn obstacles(&self) -> &[Obstacle; MAX_OBSTACLES] {
        &self.obstacles
    }

    pub fn active_count(&self) -> usize {
        self.obstacles.iter().filter(|o| o.active).count()
    }
}
