use super::collision;
use super::effect::ActiveEffect;
use super::food::Food;
use super::powerup::GridPowerUp;
use super::powerup::KINDS;
use super::robot::Robot;
use super::snake::Snake;
use super::state::State;
use super::stats::PlayerStats;
use crate::config::Config;
use crate::grid::Direction;
use crate::grid::Mulberry32;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

impl State {
    /// One tick of the world, pure in its inputs.
    ///
    /// Phases run in a fixed order and PRNG draws happen only at the marked
    /// points, so the post-tick seed is a deterministic function of the
    /// incoming state and inputs: membership spawns draw first (connected
    /// ids in lexicographic order), then food replenishment, then the
    /// power-up roll. The robot's steering uses its own generator seeded
    /// from the tick-start seed and sequence.
    pub fn advance(
        &self,
        config: &Config,
        inputs: &BTreeMap<String, Direction>,
        now: u64,
        connected: &BTreeSet<String>,
    ) -> State {
        let mut next = self.clone();
        let mut rng = Mulberry32::new(self.rng_seed);
        next.reconcile_members(connected, &mut rng);
        next.expire(now);
        next.apply_inputs(inputs);
        let dead = next.step_snakes(config, now);
        next.commit_removals(&dead);
        next.replenish_food(config, &mut rng);
        next.roll_power_up(config, now, &mut rng);
        next.finalize(now, connected, &rng);
        next
    }

    /// Spawn a snake for every connected id that lacks one and drop snakes
    /// whose owner left. A returning player gets score, deaths, and
    /// preferred colour back before the tick takes any action.
    fn reconcile_members(&mut self, connected: &BTreeSet<String>, rng: &mut Mulberry32) {
        self.snakes.retain(|s| connected.contains(&s.id));
        for id in connected {
            if !self.has_snake(id) {
                let preferred = self.player_stats.get(id).map(|s| s.color.clone());
                let occupied = self.occupied();
                let mut snake = Snake::spawn(
                    id,
                    self.grid_size.width,
                    self.grid_size.height,
                    &occupied,
                    rng,
                    preferred.as_deref(),
                );
                if let Some(stats) = self.player_stats.get(id) {
                    snake.score = stats.score;
                }
                self.snakes.push(snake);
            }
        }
        self.snakes.sort_by(|a, b| a.id.cmp(&b.id));
        for id in connected {
            if !self.player_stats.contains_key(id) {
                let color = self
                    .snake(id)
                    .map(|s| s.color.clone())
                    .unwrap_or_default();
                self.player_stats
                    .insert(id.clone(), PlayerStats::new(id, id, &color));
            }
        }
        for (id, stats) in self.player_stats.iter_mut() {
            stats.connected = connected.contains(id);
        }
    }

    /// drop grid power-ups and active effects whose time is up
    fn expire(&mut self, now: u64) {
        self.power_ups.retain(|p| p.active(now));
        self.effects.retain(|e| e.active(now));
    }

    /// Point every snake at its latest intent, except that a multi-segment
    /// snake cannot reverse into itself. The robot steers itself.
    fn apply_inputs(&mut self, inputs: &BTreeMap<String, Direction>) {
        let steered = match self.snake(crate::ROBOT_ID) {
            Some(snake) => Some(Robot::steer(self, snake)),
            None => None,
        };
        for snake in self.snakes.iter_mut() {
            let intent = match snake.id.as_str() {
                crate::ROBOT_ID => steered,
                id => inputs.get(id).copied(),
            };
            if let Some(direction) = intent {
                if direction != snake.direction.opposite() || snake.len() == 1 {
                    snake.direction = direction;
                }
            }
        }
    }

    /// Sub-stepped movement in id order: every snake takes its first step
    /// before any takes its second. A snake that collides is marked dead,
    /// stops stepping, and no longer blocks anyone else this tick; its
    /// removal commits in the next phase.
    fn step_snakes(&mut self, config: &Config, now: u64) -> BTreeSet<String> {
        let steps = self
            .snakes
            .iter()
            .map(|s| match self.speed_factor(&s.id, now) {
                f if f > 1.0 => 2,
                f if f < 1.0 => usize::from(self.sequence % 2 == 1),
                _ => 1,
            })
            .collect::<Vec<_>>();
        let mut dead = BTreeSet::new();
        for step in 0..2 {
            for i in 0..self.snakes.len() {
                if steps[i] <= step || dead.contains(&self.snakes[i].id) {
                    continue;
                }
                let id = self.snakes[i].id.clone();
                let head = self.snakes[i].next_head(self.grid_size.width, self.grid_size.height);
                let blocked = !self.invincible(&id, now)
                    && collision::hits_snake(
                        head,
                        self.snakes.iter().filter(|s| !dead.contains(&s.id)),
                        Some(&id),
                    );
                if blocked {
                    dead.insert(id);
                    continue;
                }
                self.snakes[i].slide(head);
                if let Some(j) = collision::food_at(head, &self.food) {
                    let food = self.food.remove(j);
                    let gain = food.value * self.score_multiplier(&id, now);
                    self.snakes[i].grow();
                    self.snakes[i].score += gain;
                    if let Some(stats) = self.player_stats.get_mut(&id) {
                        stats.score += gain;
                    }
                }
                if let Some(j) = collision::power_up_at(head, &self.power_ups) {
                    let power_up = self.power_ups.remove(j);
                    self.effects.push(ActiveEffect {
                        kind: power_up.kind,
                        player_id: id.clone(),
                        expires_at: now + config.effect_millis,
                    });
                }
            }
        }
        dead
    }

    /// a death costs a life, never the score
    fn commit_removals(&mut self, dead: &BTreeSet<String>) {
        for id in dead {
            let score = self.snake(id).map(|s| s.score).unwrap_or_default();
            if let Some(stats) = self.player_stats.get_mut(id) {
                stats.deaths += 1;
                stats.score = stats.score.max(score);
            }
        }
        self.snakes.retain(|s| !dead.contains(&s.id));
    }

    /// top the arena back up to the food target; a crowded grid skips
    fn replenish_food(&mut self, config: &Config, rng: &mut Mulberry32) {
        while self.food.len() < config.food_target {
            let occupied = self.occupied();
            match rng.free_cell(self.grid_size.width, self.grid_size.height, &occupied) {
                Some(cell) => self.food.push(Food {
                    position: cell,
                    value: config.food_value,
                }),
                None => {
                    log::warn!("no free cell left for food");
                    break;
                }
            }
        }
    }

    /// At most one spawn per tick: a chance draw, then a kind draw, then
    /// the free-cell search. The id counter only moves on an actual spawn.
    fn roll_power_up(&mut self, config: &Config, now: u64, rng: &mut Mulberry32) {
        if rng.next() < config.power_up_chance && self.power_ups.len() < config.max_power_ups {
            let kind = KINDS[rng.index(KINDS.len())];
            let occupied = self.occupied();
            match rng.free_cell(self.grid_size.width, self.grid_size.height, &occupied) {
                Some(cell) => {
                    let id = format!("powerup-{}", self.power_up_counter);
                    self.power_up_counter += 1;
                    self.power_ups.push(GridPowerUp {
                        id,
                        kind,
                        position: cell,
                        expires_at: now + config.power_up_millis,
                    });
                }
                None => log::warn!("no free cell left for a power-up"),
            }
        }
    }

    /// stamp the clock, advance the sequence, persist the seed, and square
    /// every live snake's score with its stats record
    fn finalize(&mut self, now: u64, connected: &BTreeSet<String>, rng: &Mulberry32) {
        self.timestamp = now;
        self.sequence += 1;
        self.rng_seed = rng.state();
        self.player_count = connected
            .iter()
            .filter(|id| id.as_str() != crate::ROBOT_ID)
            .count();
        for i in 0..self.snakes.len() {
            let id = self.snakes[i].id.clone();
            if let Some(stats) = self.player_stats.get_mut(&id) {
                if stats.score != self.snakes[i].score {
                    log::warn!(
                        "score diverged for {}: snake {} vs stats {}",
                        id,
                        self.snakes[i].score,
                        stats.score
                    );
                }
                let score = stats.score.max(self.snakes[i].score);
                stats.score = score;
                self.snakes[i].score = score;
            }
            let effects = self
                .effects
                .iter()
                .filter(|e| e.owned_by(&id))
                .cloned()
                .collect();
            self.snakes[i].effects = effects;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::PowerUpKind;
    use crate::grid::Point;

    fn config() -> Config {
        Config {
            width: 10,
            height: 10,
            power_up_chance: 0.0,
            ..Config::default()
        }
    }

    fn arena() -> State {
        State::new(&config(), 7, 1000)
    }

    fn snake(id: &str, body: &[(i32, i32)], direction: Direction) -> Snake {
        Snake {
            id: id.to_string(),
            color: "#FF0000".to_string(),
            body: body.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            direction,
            score: 0,
            effects: Vec::new(),
        }
    }

    fn food(x: i32, y: i32) -> Food {
        Food {
            position: Point::new(x, y),
            value: 1,
        }
    }

    fn effect(kind: PowerUpKind, id: &str, expires_at: u64) -> ActiveEffect {
        ActiveEffect {
            kind,
            player_id: id.to_string(),
            expires_at,
        }
    }

    fn joined(state: &mut State, snake: Snake) {
        let stats = PlayerStats::new(&snake.id, &snake.id, &snake.color);
        state.player_stats.insert(snake.id.clone(), stats);
        state.snakes.push(snake);
    }

    fn ids(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn intents(pairs: &[(&str, Direction)]) -> BTreeMap<String, Direction> {
        pairs
            .iter()
            .map(|(id, d)| (id.to_string(), *d))
            .collect()
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.food.push(food(6, 5));
        let next = state.advance(
            &config(),
            &intents(&[("p1", Direction::Right)]),
            1100,
            &ids(&["p1"]),
        );
        let p1 = next.snake("p1").unwrap();
        assert_eq!(p1.body, vec![Point::new(6, 5), Point::new(6, 5)]);
        assert_eq!(p1.score, 1);
        assert_eq!(next.player_stats["p1"].score, 1);
        assert!(next.food.iter().all(|f| f.position != Point::new(6, 5)));
        assert_eq!(next.food.len(), 3);
        assert_eq!(next.sequence, 1);
        assert_eq!(next.timestamp, 1100);
    }

    #[test]
    fn opposite_input_is_rejected_on_a_long_snake() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5), (4, 5)], Direction::Right));
        let next = state.advance(
            &config(),
            &intents(&[("p1", Direction::Left)]),
            1100,
            &ids(&["p1"]),
        );
        let p1 = next.snake("p1").unwrap();
        assert_eq!(p1.direction, Direction::Right);
        assert_eq!(p1.body, vec![Point::new(6, 5), Point::new(5, 5)]);
    }

    #[test]
    fn opposite_input_is_accepted_on_a_single_segment() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        let next = state.advance(
            &config(),
            &intents(&[("p1", Direction::Left)]),
            1100,
            &ids(&["p1"]),
        );
        let p1 = next.snake("p1").unwrap();
        assert_eq!(p1.direction, Direction::Left);
        assert_eq!(p1.body, vec![Point::new(4, 5)]);
    }

    #[test]
    fn speed_takes_two_steps_and_sweeps_the_lane() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.food.push(food(6, 5));
        state.food.push(food(7, 5));
        state.effects.push(effect(PowerUpKind::Speed, "p1", 9000));
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        let p1 = next.snake("p1").unwrap();
        assert_eq!(
            p1.body,
            vec![Point::new(7, 5), Point::new(6, 5), Point::new(6, 5)]
        );
        assert_eq!(p1.score, 2);
        assert!(next.food.iter().all(|f| f.position != Point::new(6, 5)));
        assert!(next.food.iter().all(|f| f.position != Point::new(7, 5)));
    }

    #[test]
    fn slow_moves_only_on_odd_sequences() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.effects.push(effect(PowerUpKind::Slow, "p1", 99_000));
        let even = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        assert_eq!(even.snake("p1").unwrap().head(), Point::new(5, 5));
        assert_eq!(even.sequence, 1);
        let odd = even.advance(&config(), &BTreeMap::new(), 1200, &ids(&["p1"]));
        assert_eq!(odd.snake("p1").unwrap().head(), Point::new(6, 5));
    }

    #[test]
    fn head_on_collision_kills_the_lower_id_first() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5), (4, 5)], Direction::Right));
        joined(&mut state, snake("p2", &[(6, 5), (7, 5)], Direction::Left));
        state.player_stats.get_mut("p1").unwrap().score = 5;
        state.snake_mut("p1").unwrap().score = 5;
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1", "p2"]));
        assert!(next.snake("p1").is_none());
        assert!(next.snake("p2").is_some());
        assert_eq!(next.player_stats["p1"].deaths, 1);
        assert_eq!(next.player_stats["p1"].score, 5);
        assert_eq!(next.player_stats["p2"].deaths, 0);
        assert_eq!(
            next.snake("p2").unwrap().body,
            vec![Point::new(5, 5), Point::new(6, 5)]
        );
    }

    #[test]
    fn invincibility_suppresses_collision_death() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5), (4, 5)], Direction::Right));
        joined(&mut state, snake("p2", &[(6, 5), (6, 6)], Direction::Up));
        state
            .effects
            .push(effect(PowerUpKind::Invincibility, "p1", 9000));
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1", "p2"]));
        let p1 = next.snake("p1").unwrap();
        assert_eq!(p1.head(), Point::new(6, 5));
        assert_eq!(next.player_stats["p1"].deaths, 0);
        assert_eq!(p1.effects.len(), 1);
    }

    #[test]
    fn heads_wrap_across_the_seam() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(9, 5)], Direction::Right));
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        assert_eq!(next.snake("p1").unwrap().head(), Point::new(0, 5));
    }

    #[test]
    fn collected_power_up_becomes_an_active_effect() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.power_ups.push(GridPowerUp {
            id: "powerup-0".into(),
            kind: PowerUpKind::DoubleScore,
            position: Point::new(6, 5),
            expires_at: 99_000,
        });
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        assert!(next.power_ups.is_empty());
        assert_eq!(next.effects.len(), 1);
        assert_eq!(next.effects[0].kind, PowerUpKind::DoubleScore);
        assert_eq!(next.effects[0].player_id, "p1");
        assert_eq!(next.effects[0].expires_at, 1100 + config().effect_millis);
        assert_eq!(next.snake("p1").unwrap().effects.len(), 1);
    }

    #[test]
    fn expired_entries_are_dropped_before_anything_moves() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.effects.push(effect(PowerUpKind::Speed, "p1", 1100));
        state.power_ups.push(GridPowerUp {
            id: "powerup-0".into(),
            kind: PowerUpKind::Slow,
            position: Point::new(0, 0),
            expires_at: 1050,
        });
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        assert!(next.effects.is_empty());
        assert!(next.power_ups.is_empty());
        // the expired speed effect no longer doubles the step
        assert_eq!(next.snake("p1").unwrap().head(), Point::new(6, 5));
    }

    #[test]
    fn departed_players_lose_their_snake_but_not_their_record() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        state.player_stats.get_mut("p1").unwrap().score = 10;
        state.player_stats.get_mut("p1").unwrap().deaths = 1;
        state.snake_mut("p1").unwrap().score = 10;
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&[]));
        assert!(next.snakes.is_empty());
        let stats = &next.player_stats["p1"];
        assert_eq!(stats.score, 10);
        assert_eq!(stats.deaths, 1);
        assert!(!stats.connected);
        assert_eq!(next.player_count, 0);
    }

    #[test]
    fn returning_players_respawn_with_their_score() {
        let mut state = arena();
        let mut stats = PlayerStats::new("p1", "A", "#FF0000");
        stats.score = 10;
        stats.deaths = 1;
        stats.connected = false;
        state.player_stats.insert("p1".into(), stats);
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        let p1 = next.snake("p1").unwrap();
        assert_eq!(p1.score, 10);
        assert_eq!(p1.color, "#FF0000");
        assert_eq!(p1.len(), 1);
        assert_eq!(next.player_stats["p1"].score, 10);
        assert_eq!(next.player_stats["p1"].deaths, 1);
        assert!(next.player_stats["p1"].connected);
    }

    #[test]
    fn replenishment_keeps_food_off_occupied_cells() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        let next = state.advance(&config(), &BTreeMap::new(), 1100, &ids(&["p1"]));
        assert_eq!(next.food.len(), 3);
        let occupied = next.snake("p1").unwrap().body.clone();
        for f in &next.food {
            assert!(!occupied.contains(&f.position));
            assert!(f.position.x >= 0 && f.position.x < 10);
            assert!(f.position.y >= 0 && f.position.y < 10);
        }
        let cells = next.food.iter().map(|f| f.position).collect::<Vec<_>>();
        for (i, cell) in cells.iter().enumerate() {
            assert!(!cells[..i].contains(cell));
        }
    }

    #[test]
    fn advance_is_deterministic() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5), (4, 5)], Direction::Right));
        state.food.push(food(6, 5));
        let inputs = intents(&[("p1", Direction::Down)]);
        let connected = ids(&["p1", "p2"]);
        let a = state.advance(&config(), &inputs, 1100, &connected);
        let b = state.advance(&config(), &inputs, 1100, &connected);
        assert_eq!(a, b);
        let aa = a.advance(&config(), &inputs, 1200, &connected);
        let bb = b.advance(&config(), &inputs, 1200, &connected);
        assert_eq!(aa, bb);
    }

    #[test]
    fn sequences_climb_and_seeds_march() {
        let mut state = arena();
        joined(&mut state, snake("p1", &[(5, 5)], Direction::Right));
        let connected = ids(&["p1"]);
        let mut current = state;
        for tick in 1..=10u64 {
            let next = current.advance(&config(), &BTreeMap::new(), 1000 + tick * 100, &connected);
            assert_eq!(next.sequence, current.sequence + 1);
            assert!(next.timestamp >= current.timestamp);
            current = next;
        }
    }

    #[test]
    fn random_states_stay_in_bounds() {
        use crate::Arbitrary;
        for _ in 0..50 {
            let state = State::random();
            let connected = state
                .snakes
                .iter()
                .map(|s| s.id.clone())
                .collect::<BTreeSet<_>>();
            let next = state.advance(&config(), &BTreeMap::new(), state.timestamp + 100, &connected);
            for point in next.occupied() {
                assert!(point.x >= 0 && point.x < next.grid_size.width);
                assert!(point.y >= 0 && point.y < next.grid_size.height);
            }
            for snake in &next.snakes {
                assert_eq!(snake.score, next.player_stats[&snake.id].score);
            }
            assert_eq!(next.sequence, state.sequence + 1);
        }
    }

    impl crate::Arbitrary for State {
        fn random() -> Self {
            let mut state = arena();
            state.sequence = rand::random_range(0..100);
            state.timestamp = 1000 + rand::random_range(0..10_000);
            state.rng_seed = rand::random();
            for i in 0..rand::random_range(1..4usize) {
                let id = format!("p{}", i);
                let x = rand::random_range(0..10i32);
                let y = rand::random_range(0..10i32);
                let length = rand::random_range(1..4i32);
                let body = (0..length)
                    .map(|step| (x, (y + step) % 10))
                    .collect::<Vec<_>>();
                joined(&mut state, snake(&id, &body, Direction::Right));
            }
            for _ in 0..rand::random_range(0..3usize) {
                state.food.push(food(
                    rand::random_range(0..10i32),
                    rand::random_range(0..10i32),
                ));
            }
            state
        }
    }
}
