pub mod config;
pub mod dto;
pub mod gameplay;
pub mod grid;
pub mod hosting;
pub mod session;

/// reserved identity for the server-driven snake
pub const ROBOT_ID: &str = "robot";

/// seconds the process gets to drain connections after a shutdown signal
const SHUTDOWN_GRACE_SECS: u64 = 10;

/// random construction, for tests only
pub trait Arbitrary {
    fn random() -> Self;
}

/// wall-clock milliseconds since the unix epoch
pub fn clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_millis() as u64
}

/// initialize logging and arm the shutdown watchdog.
/// graceful shutdown is the server's job; a process still alive ten seconds
/// after the signal dies nonzero.
pub fn init() {
    tokio::spawn(async move {
        shutdown().await;
        log::warn!("shutdown requested");
        tokio::time::sleep(std::time::Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
        log::warn!("forcing exit");
        std::process::exit(1);
    });
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// resolves on SIGINT or SIGTERM
async fn shutdown() {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
