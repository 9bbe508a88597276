use serde::Deserialize;
use serde::Serialize;

/// Per-player record that outlives the snake: created on first join, never
/// deleted. Score and deaths persist across respawns and reconnects; only
/// the connected flag tracks the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub id: String,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub deaths: u32,
    pub connected: bool,
}

impl PlayerStats {
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            score: 0,
            deaths: 0,
            connected: true,
        }
    }
}
