//! Arena server binary.
//!
//! Boots logging, reads configuration from flags or the environment, and
//! runs the WebSocket hosting server until a shutdown signal arrives.

use clap::Parser;
use robosnake::config::Config;
use robosnake::hosting::Server;

#[tokio::main]
async fn main() {
    robosnake::init();
    Server::run(Config::parse()).await.unwrap();
}
