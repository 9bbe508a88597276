use crate::grid::Point;
use serde::Deserialize;
use serde::Serialize;

/// Timed modifier categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    Speed,
    Slow,
    Invincibility,
    DoubleScore,
}

/// canonical order for random kind selection
pub const KINDS: [PowerUpKind; 4] = [
    PowerUpKind::Speed,
    PowerUpKind::Slow,
    PowerUpKind::Invincibility,
    PowerUpKind::DoubleScore,
];

/// A collectable placed on the grid, despawning at `expires_at` if ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPowerUp {
    pub id: String,
    pub kind: PowerUpKind,
    pub position: Point,
    pub expires_at: u64,
}

impl GridPowerUp {
    /// strictly-greater comparison so a power-up expiring exactly now is gone
    pub fn active(&self, now: u64) -> bool {
        self.expires_at > now
    }
}
