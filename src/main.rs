mod app;
mod backend;
mod chart;
mod config;
mod domain;
mod handlers;
mod infra;
mod matcher;
mod panel;
mod registry;
mod terminal;
mod ui;

use crate::app::{App, BackendEvent, BackendTask};
use crate::backend::worker_loop;
use crate::config::AppConfig;
use crate::handlers::{handle_backend_event, handle_key_event};
use crate::registry::Registry;
use crate::terminal::{Tui, restore_terminal, setup_terminal};
use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match AppConfig::load_or_default() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load config, using defaults: {err:#}");
            AppConfig::default()
        }
    };

    let Some(data_path) = config.resolve_data_path(std::env::args_os().nth(1).map(PathBuf::from))
    else {
        bail!("usage: sitemap-tui <tree.json> (or set data_path in the config file)");
    };

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, config, data_path).await;

    restore_terminal(&mut terminal)?;
    if let Err(err) = run_result {
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(terminal: &mut Tui, config: AppConfig, data_path: PathBuf) -> Result<()> {
    let (registry, registry_error) = match config.registry() {
        Ok(registry) => (registry, None),
        Err(err) => (Registry::default(), Some(format!("{err:#}"))),
    };
    let mut app = App::new(config, registry);
    if let Some(message) = registry_error {
        app.log(format!("error[config]: {message}; using built-in categories"));
    }

    let (task_tx, task_rx) = mpsc::unbounded_channel::<BackendTask>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<BackendEvent>();

    tokio::spawn(worker_loop(task_rx, event_tx));

    send_task(&mut app, &task_tx, BackendTask::LoadTree { path: data_path })?;

    while !app.should_quit {
        while let Ok(event) = event_rx.try_recv() {
            handle_backend_event(&mut app, event)?;
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(100)).context("event poll failed")?
            && let Event::Key(key) = event::read().context("event read failed")?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(&mut app, key)?;
        }
    }

    Ok(())
}

fn send_task(app: &mut App, task_tx: &UnboundedSender<BackendTask>, task: BackendTask) -> Result<()> {
    task_tx
        .send(task)
        .context("background worker is not running")?;
    app.busy = true;
    Ok(())
}
