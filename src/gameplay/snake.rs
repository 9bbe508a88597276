use super::effect::ActiveEffect;
use crate::grid::Direction;
use crate::grid::Mulberry32;
use crate::grid::Point;
use crate::grid::DIRECTIONS;
use serde::Deserialize;
use serde::Serialize;

/// fallback colours, indexed by a rolling hash of the player id
const PALETTE: [&str; 10] = [
    "#E6194B", "#3CB44B", "#FFE119", "#4363D8", "#F58231",
    "#911EB4", "#46F0F0", "#F032E6", "#BCF60C", "#008080",
];

/// One player's snake.
///
/// The body is head-first and never empty. Adjacent segments are either
/// equal (right after growth) or one torus step apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub id: String,
    pub color: String,
    pub body: Vec<Point>,
    pub direction: Direction,
    pub score: u32,
    #[serde(rename = "activePowerUps")]
    pub effects: Vec<ActiveEffect>,
}

impl Snake {
    /// Spawn a fresh one-segment snake at a random free cell with a random
    /// heading. A syntactically valid preferred colour is adopted verbatim;
    /// anything else falls back to the palette. A full grid degrades to a
    /// sentinel at the origin so the caller never loses the player.
    pub fn spawn(
        id: &str,
        width: i32,
        height: i32,
        occupied: &[Point],
        rng: &mut Mulberry32,
        preferred: Option<&str>,
    ) -> Self {
        let color = preferred
            .filter(|c| valid_color(c))
            .map(str::to_string)
            .unwrap_or_else(|| fallback_color(id).to_string());
        match rng.free_cell(width, height, occupied) {
            Some(cell) => Self {
                id: id.to_string(),
                color,
                body: vec![cell],
                direction: DIRECTIONS[rng.index(4)],
                score: 0,
                effects: Vec::new(),
            },
            None => {
                log::error!("no free cell to spawn {}", id);
                Self {
                    id: id.to_string(),
                    color,
                    body: vec![Point::new(0, 0)],
                    direction: Direction::Right,
                    score: 0,
                    effects: Vec::new(),
                }
            }
        }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// next head position under the current heading
    pub fn next_head(&self, width: i32, height: i32) -> Point {
        self.direction.step(self.head(), width, height)
    }

    /// advance: new head in front, tail cell vacated
    pub fn slide(&mut self, head: Point) {
        self.body.insert(0, head);
        self.body.pop();
    }

    /// grow by one segment, duplicating the current tail
    pub fn grow(&mut self) {
        self.body.push(self.tail());
    }
}

/// syntactically valid #RRGGBB
pub fn valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// 32-bit rolling hash of the id, reduced into the palette
pub(crate) fn fallback_color(id: &str) -> &'static str {
    let hash = id
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    PALETTE[hash as usize % PALETTE.len()]
}
