mod advance;
pub mod collision;
mod effect;
mod food;
mod powerup;
mod robot;
mod snake;
mod state;
mod stats;

pub use effect::*;
pub use food::*;
pub use powerup::*;
pub use robot::*;
pub use snake::*;
pub use state::*;
pub use stats::*;
