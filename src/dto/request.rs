use crate::session::ProfileUpdate;
use serde::Deserialize;

/// Client → server messages, tagged by `type`.
///
/// `input` carries one intent axis (`dx` or `dy`, each in -1..=1); the
/// session rejects diagonals. `updateProfile` carries a full profile edit.
/// Anything that fails to parse is dropped by the lobby at debug level.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Input { dx: i32, dy: i32 },
    UpdateProfile(ProfileUpdate),
}
