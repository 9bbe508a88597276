use crate::grid::Point;
use serde::Deserialize;
use serde::Serialize;

/// A collectable worth `value` points to whoever reaches it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub position: Point,
    pub value: u32,
}
