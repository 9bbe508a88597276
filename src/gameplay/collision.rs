use super::food::Food;
use super::powerup::GridPowerUp;
use super::snake::Snake;
use crate::grid::Point;

/// Walls do not exist on a torus. The predicate stays in the API so
/// grid-edge behaviour keeps a regression surface.
pub fn hits_wall(_point: Point) -> bool {
    false
}

/// True when the point lies on any segment of any listed snake. The head of
/// `self_id` is skipped: a snake never collides with its own moving head.
pub fn hits_snake<'a>(
    point: Point,
    snakes: impl IntoIterator<Item = &'a Snake>,
    self_id: Option<&str>,
) -> bool {
    snakes.into_iter().any(|snake| {
        let skip = usize::from(self_id == Some(snake.id.as_str()));
        snake.body.iter().skip(skip).any(|segment| *segment == point)
    })
}

/// index of the food under the point, if any
pub fn food_at(point: Point, food: &[Food]) -> Option<usize> {
    food.iter().position(|f| f.position == point)
}

/// index of the grid power-up under the point, if any
pub fn power_up_at(point: Point, power_ups: &[GridPowerUp]) -> Option<usize> {
    power_ups.iter().position(|p| p.position == point)
}
