mod app;
mod handler;
mod tui;
mod ui;

use anyhow::Result;
use lastfive_core::Config;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use tui::EventHandler;

/// Log to a daily file; the terminal belongs to the UI.
///
/// The filter comes from `RUST_LOG`, then the config's `log_filter`, then `info`.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let log_dir = config.log_dir().ok()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = tracing_appender::rolling::daily(log_dir, "lastfive.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok()?;

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_result = Config::load();
    let config = config_result.as_ref().cloned().unwrap_or_else(|_| Config::new());

    let _log_guard = init_logging(&config);
    if let Err(err) = &config_result {
        warn!(error = %err, "config unreadable, using defaults");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut app = App::new(&config);
    app.start_health_check();

    // Install panic hook before initializing terminal
    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        }

        // Pick up finished background work
        app.poll_query_task().await;
        app.poll_health_task().await;

        if app.should_quit {
            break;
        }
    }

    tui::restore()?;
    info!("exiting");
    Ok(())
}
