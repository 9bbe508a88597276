use super::powerup::PowerUpKind;
use serde::Deserialize;
use serde::Serialize;

/// A modifier one player is currently under. A player may hold several at
/// once; each is evaluated independently against the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub player_id: String,
    pub expires_at: u64,
}

impl ActiveEffect {
    /// strictly-greater comparison so an effect expiring exactly now is gone
    pub fn active(&self, now: u64) -> bool {
        self.expires_at > now
    }

    pub fn owned_by(&self, id: &str) -> bool {
        self.player_id == id
    }
}
