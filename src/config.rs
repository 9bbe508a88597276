use clap::Parser;

/// Runtime knobs for the arena and its transport.
///
/// Every flag doubles as an environment variable so deployments can
/// configure the server without a command line. Defaults are the reference
/// values the wire protocol was tuned against; tests construct the struct
/// directly and override what they need.
#[derive(Parser, Debug, Clone)]
#[command(name = "robosnake", about = "authoritative multiplayer snake server")]
pub struct Config {
    /// port the HTTP/WebSocket server binds on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// simulation tick period in milliseconds; also the logical time step
    #[arg(long, env = "TICK_MILLIS", default_value_t = 100)]
    pub tick_millis: u64,

    /// grid width in cells
    #[arg(long, env = "GRID_WIDTH", default_value_t = 50)]
    pub width: i32,

    /// grid height in cells
    #[arg(long, env = "GRID_HEIGHT", default_value_t = 50)]
    pub height: i32,

    /// number of food items the arena is refilled to each tick
    #[arg(long, env = "FOOD_TARGET", default_value_t = 3)]
    pub food_target: usize,

    /// score value of a single food item
    #[arg(long, env = "FOOD_VALUE", default_value_t = 1)]
    pub food_value: u32,

    /// maximum number of uncollected power-ups on the grid
    #[arg(long, env = "MAX_POWER_UPS", default_value_t = 2)]
    pub max_power_ups: usize,

    /// per-tick probability of spawning a power-up
    #[arg(long, env = "POWER_UP_CHANCE", default_value_t = 0.01)]
    pub power_up_chance: f64,

    /// lifetime of an uncollected power-up in milliseconds
    #[arg(long, env = "POWER_UP_MILLIS", default_value_t = 10_000)]
    pub power_up_millis: u64,

    /// lifetime of a collected effect in milliseconds
    #[arg(long, env = "EFFECT_MILLIS", default_value_t = 8_000)]
    pub effect_millis: u64,

    /// explicit PRNG seed; defaults to a wall-clock derived value
    #[arg(long, env = "SEED")]
    pub seed: Option<u32>,

    /// run the arena without the server-driven snake
    #[arg(long, env = "NO_ROBOT")]
    pub no_robot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            tick_millis: 100,
            width: 50,
            height: 50,
            food_target: 3,
            food_value: 1,
            max_power_ups: 2,
            power_up_chance: 0.01,
            power_up_millis: 10_000,
            effect_millis: 8_000,
            seed: None,
            no_robot: false,
        }
    }
}
