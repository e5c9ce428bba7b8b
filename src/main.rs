use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use knowyourbody_core::{Config, GeminiClient};
use tracing_subscriber::EnvFilter;

mod app;
mod content;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

const DEFAULT_LOG_FILTER: &str = "knowyourbody=info,knowyourbody_core=info";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    tracing::info!("KnowYourBody v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load config, falling back to defaults
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        Config::new()
    });

    // The credential is required before anything touches the terminal
    let api_key = config.resolve_api_key()?;
    let mut client = GeminiClient::new(&api_key).with_model(config.model());
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url.as_str());
    }
    tracing::info!(model = client.model(), "assistant backend ready");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(Arc::new(client), config.model(), events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("KnowYourBody exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("knowyourbody"))
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir.join("knowyourbody.log")))
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());

    let Some(file) = log_file else {
        // Nowhere to write; stay silent rather than corrupt the screen
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
