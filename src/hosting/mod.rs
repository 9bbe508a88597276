mod lobby;
mod server;

pub use lobby::*;
pub use server::*;
