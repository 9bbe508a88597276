use super::collision;
use super::food::Food;
use super::snake::Snake;
use super::state::State;
use crate::grid::Direction;
use crate::grid::Mulberry32;
use crate::grid::DIRECTIONS;

/// The server-driven snake's steering policy.
///
/// Steering is a pure function of the state: the local PRNG is seeded from
/// the tick-start seed and sequence, so a replayed tick reproduces the same
/// decision without touching the simulation's own generator.
pub struct Robot;

impl Robot {
    /// direction for the upcoming tick
    pub fn steer(state: &State, snake: &Snake) -> Direction {
        let mut rng = Mulberry32::new(state.rng_seed.wrapping_add(state.sequence as u32));
        if let Some(direction) = Self::mistake(&mut rng, snake) {
            return direction;
        }
        let valid = Self::valid(state, snake);
        if valid.is_empty() {
            return snake.direction;
        }
        match Self::closest_food(state, snake) {
            Some(food) => Self::chase(state, snake, food, &valid),
            None => Self::wander(&mut rng, snake, &valid),
        }
    }

    /// Occasional deliberate error, more likely the longer the body grows,
    /// capped at 15%. A drawn direction is vetoed only when it would reverse
    /// a multi-segment snake; the veto falls through to honest steering.
    fn mistake(rng: &mut Mulberry32, snake: &Snake) -> Option<Direction> {
        let threshold = (0.05 + 0.002 * snake.len() as f64).min(0.15);
        if rng.next() < threshold && rng.next() < 0.5 {
            let direction = DIRECTIONS[rng.index(4)];
            if direction != snake.direction.opposite() || snake.len() == 1 {
                return Some(direction);
            }
        }
        None
    }

    /// directions whose committed next head hits nothing, self head excluded
    fn valid(state: &State, snake: &Snake) -> Vec<Direction> {
        let (w, h) = (state.grid_size.width, state.grid_size.height);
        DIRECTIONS
            .into_iter()
            .filter(|d| {
                let head = d.step(snake.head(), w, h);
                !collision::hits_wall(head)
                    && !collision::hits_snake(head, &state.snakes, Some(&snake.id))
            })
            .collect()
    }

    /// nearest food by wrap-aware Manhattan distance; first minimum wins
    fn closest_food(state: &State, snake: &Snake) -> Option<Food> {
        let (w, h) = (state.grid_size.width, state.grid_size.height);
        state
            .food
            .iter()
            .min_by_key(|f| snake.head().manhattan(f.position, w, h))
            .copied()
    }

    /// First valid direction in preference order: the toward-directions with
    /// the larger-magnitude axis first (ties horizontal before vertical),
    /// then the remaining canonical directions.
    fn chase(state: &State, snake: &Snake, food: Food, valid: &[Direction]) -> Direction {
        let (w, h) = (state.grid_size.width, state.grid_size.height);
        let (dx, dy) = snake.head().torus_delta(food.position, w, h);
        let horizontal = match dx {
            d if d > 0 => Some(Direction::Right),
            d if d < 0 => Some(Direction::Left),
            _ => None,
        };
        let vertical = match dy {
            d if d > 0 => Some(Direction::Down),
            d if d < 0 => Some(Direction::Up),
            _ => None,
        };
        let toward = match dx.abs() >= dy.abs() {
            true => [horizontal, vertical],
            false => [vertical, horizontal],
        };
        toward
            .into_iter()
            .flatten()
            .chain(DIRECTIONS)
            .find(|d| valid.contains(d))
            .unwrap_or(snake.direction)
    }

    /// keep heading when possible, otherwise scale a draw into the valid
    /// list (which stays in canonical order)
    fn wander(rng: &mut Mulberry32, snake: &Snake, valid: &[Direction]) -> Direction {
        match valid.contains(&snake.direction) {
            true => snake.direction,
            false => valid[rng.index(valid.len())],
        }
    }
}
