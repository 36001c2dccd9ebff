pub mod model;
pub mod settings;
pub mod terminal;
pub mod timer;
mod utils;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use settings::SettingsStore;
use terminal::{help_text, Command, TerminalDisplay};
use timer::{DirectorySink, SystemClock, TimerController};

const ENABLE_LOGS: bool = true;

const DEFAULT_SETTINGS_FILE: &str = "video-timer.json";

pub fn run() -> Result<()> {
    let debug_mode = std::env::var("VIDEO_TIMER_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // RUST_LOG still wins for individual modules
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    log_info!("video-timer starting up...");

    let settings_path = std::env::var_os("VIDEO_TIMER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let store = SettingsStore::new(settings_path)?;
    log_debug!("Settings loaded from {}", store.path().display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(store))
}

async fn serve(store: SettingsStore) -> Result<()> {
    let settings = store.settings();
    let notes = settings.marker_notes.clone();

    let sink = DirectorySink::new(settings.export_dir.clone());
    let timer = TimerController::new(&settings, Arc::new(SystemClock), Arc::new(sink.clone()));

    println!("{}", help_text(&notes));

    let display = Arc::new(Mutex::new(TerminalDisplay::new(std::io::stdout())));
    timer.attach_display(display.clone()).await;

    let cancel = CancellationToken::new();
    let refresh = timer.spawn_refresh(display, cancel.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match Command::parse(&line, &notes) {
            Command::Toggle => {
                timer.toggle().await?;
            }
            Command::Marker(note) => {
                timer.add_marker(&note).await?;
            }
            Command::Quit => break,
            Command::Unknown(input) => log_warn!("Unknown command: {}", input),
        }
    }

    cancel.cancel();
    refresh.await.context("refresh loop task failed to join")?;
    sink.flush().await;
    println!();
    log_info!("video-timer shutting down");
    Ok(())
}
