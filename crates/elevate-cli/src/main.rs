//! `elevate`: terminal UI over the TechElevate admin tables.
//!
//! # Usage
//!
//! ```
//! elevate --url http://localhost:8000/v1 --token <jwt>
//! elevate --config ~/.config/elevate/config.toml --tab companies
//! ```

mod app;
mod settings;
mod ui;

#[cfg(test)]
mod tests;

use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::{App, SyncEvent, Tab};
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use elevate_client::ApiClient;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{AppConfig, Role};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "elevate", about = "Terminal UI for the TechElevate admin tables")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "ELEVATE_CONFIG")]
  config: Option<PathBuf>,

  /// Base URL of the API, including the version prefix.
  #[arg(long)]
  url: Option<String>,

  /// Bearer token for the API.
  #[arg(long)]
  token: Option<String>,

  /// Role of the signed-in reviewer.
  #[arg(long, value_enum)]
  role: Option<Role>,

  /// Tab to open on start.
  #[arg(long, value_enum)]
  tab: Option<Tab>,

  /// Rows per page; 0 shows everything.
  #[arg(long)]
  page_size: Option<usize>,

  /// Where to write logs.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl Args {
  /// Flags win over the file and environment.
  fn apply(self, config: &mut AppConfig) {
    if let Some(url) = self.url {
      config.base_url = url;
    }
    if let Some(token) = self.token {
      config.token = Some(token);
    }
    if let Some(role) = self.role {
      config.role = role;
    }
    if let Some(tab) = self.tab {
      config.default_tab = tab;
    }
    if let Some(n) = self.page_size {
      config.page_size = n;
    }
    if let Some(path) = self.log_file {
      config.log_file = path;
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let mut config = AppConfig::load(args.config.as_deref())?;
  args.apply(&mut config);

  // The terminal belongs to the UI, so logs go to a file.
  let log_file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&config.log_file)
    .with_context(|| format!("opening log file {}", config.log_file.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(log_file))
    .with_ansi(false)
    .init();

  info!(base_url = %config.base_url, role = ?config.role, "starting elevate");

  let client = ApiClient::new(config.api_config()).context("building API client")?;
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut app = App::new(&config, client, tx)?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.refresh_all();
  let run_result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  rx: &mut UnboundedReceiver<SyncEvent>,
) -> Result<()> {
  loop {
    // Apply whatever the spawned API calls have reported since last frame.
    while let Ok(sync) = rx.try_recv() {
      app.handle_sync(sync);
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key) {
        break;
      }
    }
  }

  Ok(())
}
