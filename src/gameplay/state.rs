use super::effect::ActiveEffect;
use super::food::Food;
use super::powerup::GridPowerUp;
use super::powerup::PowerUpKind;
use super::snake::Snake;
use super::stats::PlayerStats;
use crate::config::Config;
use crate::grid::Point;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Published grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

/// The whole world at one tick.
///
/// This struct doubles as the `state-sync` snapshot: serializing it yields
/// the wire shape verbatim. Snakes are kept sorted by id so that iteration
/// order, processing priority, and the serialized list all agree; the stats
/// map serializes in lexicographic id order by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub grid_size: GridSize,
    pub snakes: Vec<Snake>,
    pub food: Vec<Food>,
    pub power_ups: Vec<GridPowerUp>,
    #[serde(rename = "activePowerUps")]
    pub effects: Vec<ActiveEffect>,
    pub timestamp: u64,
    pub sequence: u64,
    pub rng_seed: u32,
    pub player_count: usize,
    pub power_up_counter: u64,
    pub player_stats: BTreeMap<String, PlayerStats>,
}

impl State {
    /// empty arena at the given instant
    pub fn new(config: &Config, seed: u32, now: u64) -> Self {
        Self {
            grid_size: GridSize {
                width: config.width,
                height: config.height,
            },
            snakes: Vec::new(),
            food: Vec::new(),
            power_ups: Vec::new(),
            effects: Vec::new(),
            timestamp: now,
            sequence: 0,
            rng_seed: seed,
            player_count: 0,
            power_up_counter: 0,
            player_stats: BTreeMap::new(),
        }
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn snake_mut(&mut self, id: &str) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id)
    }

    pub fn has_snake(&self, id: &str) -> bool {
        self.snakes.iter().any(|s| s.id == id)
    }

    /// every occupied cell in fixed order: snake segments (snakes in id
    /// order, head to tail), then food, then grid power-ups
    pub fn occupied(&self) -> Vec<Point> {
        self.snakes
            .iter()
            .flat_map(|s| s.body.iter().copied())
            .chain(self.food.iter().map(|f| f.position))
            .chain(self.power_ups.iter().map(|p| p.position))
            .collect()
    }

    /// true when the player holds a live effect of the given kind
    pub fn is_active(&self, kind: PowerUpKind, id: &str, now: u64) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == kind && e.owned_by(id) && e.active(now))
    }

    /// Speed outranks Slow when both are held
    pub fn speed_factor(&self, id: &str, now: u64) -> f64 {
        if self.is_active(PowerUpKind::Speed, id, now) {
            2.0
        } else if self.is_active(PowerUpKind::Slow, id, now) {
            0.5
        } else {
            1.0
        }
    }

    /// multipliers do not stack
    pub fn score_multiplier(&self, id: &str, now: u64) -> u32 {
        if self.is_active(PowerUpKind::DoubleScore, id, now) {
            2
        } else {
            1
        }
    }

    pub fn invincible(&self, id: &str, now: u64) -> bool {
        self.is_active(PowerUpKind::Invincibility, id, now)
    }
}
