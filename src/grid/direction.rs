use super::point::Point;
use serde::Deserialize;
use serde::Serialize;

/// The four axis-aligned headings. Up decreases y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// canonical enumeration order; every PRNG-drawn index resolves against it
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// unit vector in grid space, y growing downward
    pub fn vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// wire mapping: dx=-1 left, dx=1 right, dy=1 up, dy=-1 down.
    /// anything with both axes set, or neither, is rejected.
    pub fn from_axes(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            (0, 1) => Some(Self::Up),
            (0, -1) => Some(Self::Down),
            _ => None,
        }
    }

    /// one step from the given point, wrapped
    pub fn step(self, from: Point, width: i32, height: i32) -> Point {
        let (dx, dy) = self.vector();
        Point::new(from.x + dx, from.y + dy).wrap(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl crate::Arbitrary for Direction {
        fn random() -> Self {
            DIRECTIONS[rand::random_range(0..4)]
        }
    }

    #[test]
    fn opposites_are_symmetric() {
        for direction in DIRECTIONS {
            assert_eq!(direction.opposite().opposite(), direction);
            assert!(direction.opposite() != direction);
        }
    }

    #[test]
    fn wire_axes_map_to_headings() {
        assert_eq!(Direction::from_axes(-1, 0), Some(Direction::Left));
        assert_eq!(Direction::from_axes(1, 0), Some(Direction::Right));
        assert_eq!(Direction::from_axes(0, 1), Some(Direction::Up));
        assert_eq!(Direction::from_axes(0, -1), Some(Direction::Down));
    }

    #[test]
    fn diagonal_and_idle_axes_are_rejected() {
        assert_eq!(Direction::from_axes(1, 1), None);
        assert_eq!(Direction::from_axes(-1, 1), None);
        assert_eq!(Direction::from_axes(0, 0), None);
        assert_eq!(Direction::from_axes(2, 0), None);
    }

    #[test]
    fn up_decreases_y() {
        let head = Direction::Up.step(Point::new(5, 5), 10, 10);
        assert_eq!(head, Point::new(5, 4));
    }

    #[test]
    fn step_wraps_every_edge() {
        assert_eq!(Direction::Right.step(Point::new(9, 5), 10, 10), Point::new(0, 5));
        assert_eq!(Direction::Left.step(Point::new(0, 5), 10, 10), Point::new(9, 5));
        assert_eq!(Direction::Up.step(Point::new(5, 0), 10, 10), Point::new(5, 9));
        assert_eq!(Direction::Down.step(Point::new(5, 9), 10, 10), Point::new(5, 0));
    }

    #[test]
    fn serializes_as_uppercase_names() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, "\"UP\"");
    }
}
