use serde::Deserialize;
use serde::Serialize;

/// Integer cell on the toroidal grid. All arithmetic wraps both axes into
/// `[0, width) x [0, height)` on the non-negative side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// wrap both coordinates into bounds
    pub fn wrap(self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// shortest signed per-axis steps from self to other on the torus
    pub fn torus_delta(self, other: Self, width: i32, height: i32) -> (i32, i32) {
        (
            delta(self.x, other.x, width),
            delta(self.y, other.y, height),
        )
    }

    /// wrap-aware Manhattan distance
    pub fn manhattan(self, other: Self, width: i32, height: i32) -> i32 {
        let (dx, dy) = self.torus_delta(other, width, height);
        dx.abs() + dy.abs()
    }
}

/// shortest signed difference from a to b on a ring of the given span.
/// an exact half-span tie resolves to the positive side.
fn delta(a: i32, b: i32, span: i32) -> i32 {
    let d = (b - a).rem_euclid(span);
    if d > span / 2 { d - span } else { d }
}
