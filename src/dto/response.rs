use crate::gameplay::State;
use serde::Serialize;

/// Server → client messages, tagged by `type`. The snapshot borrows the
/// session's state so broadcast serialization never clones the world.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage<'a> {
    #[serde(rename = "state-sync")]
    StateSync(&'a State),
}
