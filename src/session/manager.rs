use super::profile::ProfileUpdate;
use crate::config::Config;
use crate::gameplay::fallback_color;
use crate::gameplay::valid_color;
use crate::gameplay::PlayerStats;
use crate::gameplay::State;
use crate::grid::Direction;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Exclusive owner of the world state.
///
/// Every mutation funnels through this type: the transport copies intents
/// and profile edits in, and `tick` drains them into the pure reducer at
/// the tick boundary. Intents are level-triggered, so the last value before
/// a tick is the one that tick consumes. The state handed back for
/// broadcast is a fresh value; a published snapshot is never touched again.
#[derive(Debug)]
pub struct Session {
    config: Config,
    state: State,
    connected: BTreeSet<String>,
    intents: BTreeMap<String, Direction>,
    profiles: Vec<ProfileUpdate>,
}

impl Session {
    pub fn new(config: Config, now: u64) -> Self {
        let seed = config.seed.unwrap_or(now as u32);
        Self {
            state: State::new(&config, seed, now),
            config,
            connected: BTreeSet::new(),
            intents: BTreeMap::new(),
            profiles: Vec::new(),
        }
    }

    /// the latest published state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Register a connection. Stats are created on first join and preserved
    /// afterwards; the colour becomes the preferred colour for the next
    /// spawn, and the name lands immediately.
    pub fn add_player(&mut self, id: &str, name: Option<&str>, color: Option<&str>) {
        self.connected.insert(id.to_string());
        let stats = self
            .state
            .player_stats
            .entry(id.to_string())
            .or_insert_with(|| PlayerStats::new(id, id, fallback_color(id)));
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            stats.name = name.to_string();
        }
        if let Some(color) = color.filter(|c| valid_color(c)) {
            stats.color = color.to_string();
        }
        stats.connected = true;
        log::info!("{} joined", id);
    }

    /// Deregister. Safe to call twice; the snake disappears on the next
    /// tick while the stats record stays forever.
    pub fn remove_player(&mut self, id: &str) {
        self.intents.remove(id);
        if let Some(stats) = self.state.player_stats.get_mut(id) {
            stats.connected = false;
        }
        if self.connected.remove(id) {
            log::info!("{} left", id);
        }
    }

    /// Stash the latest intent for the next tick. Unknown ids and inputs
    /// with both axes set are dropped without comment.
    pub fn set_input(&mut self, id: &str, dx: i32, dy: i32) {
        if !self.connected.contains(id) {
            return;
        }
        match Direction::from_axes(dx, dy) {
            Some(direction) => {
                self.intents.insert(id.to_string(), direction);
            }
            None => log::debug!("ignoring input ({}, {}) from {}", dx, dy, id),
        }
    }

    /// queue a profile edit for the start of the next tick
    pub fn queue_profile_update(&mut self, update: ProfileUpdate) {
        if update.valid() {
            self.profiles.push(update);
        } else {
            log::debug!("dropping invalid profile update for {}", update.player_id);
        }
    }

    /// Run one tick at the given wall-clock instant. Returns the fresh
    /// state for broadcast, or None while the arena is idle.
    pub fn tick(&mut self, now: u64) -> Option<State> {
        if self.connected.is_empty() && !self.state.has_snake(crate::ROBOT_ID) {
            return None;
        }
        self.apply_profiles();
        let now = self.clamp(now);
        let connected = self.participants();
        self.state = self.state.advance(&self.config, &self.intents, now, &connected);
        Some(self.state.clone())
    }

    /// connected humans, plus the robot while any human is present
    fn participants(&self) -> BTreeSet<String> {
        let mut ids = self.connected.clone();
        if !self.config.no_robot && !self.connected.is_empty() {
            ids.insert(crate::ROBOT_ID.to_string());
        }
        ids
    }

    /// Elapsed wall-clock capped at five tick periods so a suspended host
    /// resumes without a simulation jump; time never runs backwards.
    fn clamp(&self, now: u64) -> u64 {
        let ceiling = self.state.timestamp + 5 * self.config.tick_millis;
        now.clamp(self.state.timestamp, ceiling)
    }

    /// profile edits land before the reducer runs
    fn apply_profiles(&mut self) {
        for update in std::mem::take(&mut self.profiles) {
            if !self.state.player_stats.contains_key(&update.player_id) {
                log::warn!("profile update for unknown player {}", update.player_id);
                continue;
            }
            if let Some(stats) = self.state.player_stats.get_mut(&update.player_id) {
                stats.name = update.name.clone();
                stats.color = update.color.clone();
            }
            if let Some(snake) = self.state.snake_mut(&update.player_id) {
                snake.color = update.color;
            }
        }
    }
}
