use crate::gameplay::valid_color;
use serde::Deserialize;

/// A player-initiated profile edit. Validated before it enters the queue;
/// invalid edits never reach the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub player_id: String,
    pub name: String,
    pub color: String,
}

impl ProfileUpdate {
    /// non-empty name of at most 16 characters and a #RRGGBB colour
    pub fn valid(&self) -> bool {
        !self.name.is_empty() && self.name.chars().count() <= 16 && valid_color(&self.color)
    }
}
