mod app;
mod clipboard;
mod components;
mod config;
mod error;
mod event;
mod handler;
mod host;
mod logging;
mod nav;
mod store;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::app::App;
use crate::clipboard::SystemClipboard;
use crate::config::{AppConfig, GeneralConfig};
use crate::event::{Event, EventHandler};
use crate::host::local::LocalHost;
use crate::nav::controller::{NavOptions, NavigationController};
use crate::nav::icons::{IconCache, IconPolicy};
use crate::nav::layout::{LayoutPersistence, PaneGroup, PaneLayout};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::tui::{install_panic_hook, Tui};

/// A two-pane terminal file explorer.
#[derive(Parser, Debug)]
#[command(name = "fx", version, about)]
struct Cli {
    /// Directory to open (defaults to the configured start path, then the desktop)
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the layout in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log file (filter with FX_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Command used by "open in editor"
    #[arg(long)]
    editor: Option<String>,
}

impl Cli {
    /// Flags that override config file values.
    fn overrides(&self) -> error::Result<AppConfig> {
        let start_path = match &self.path {
            Some(path) => {
                let path = path.canonicalize().map_err(|_| {
                    error::AppError::InvalidPath(format!("{} does not exist", path.display()))
                })?;
                Some(path.to_string_lossy().into_owned())
            }
            None => None,
        };
        Ok(AppConfig {
            general: GeneralConfig {
                start_path,
                editor: self.editor.clone(),
            },
            ..AppConfig::default()
        })
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let overrides = cli.overrides()?;

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;
    let config = AppConfig::load(cli.config.as_deref(), Some(&overrides));
    info!(?config, "starting");

    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::open(&config.store_path()).await)
    };
    let persistence = LayoutPersistence::new(
        store,
        Duration::from_millis(config.debounce_ms()),
        PaneLayout::with_sidebar(config.sidebar_percent()),
    );
    let restored = persistence.restore().await;
    let mut panes = PaneGroup::new(config.min_sidebar_percent());

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    let mut nav = NavigationController::new(
        Arc::new(LocalHost::new()),
        Arc::new(IconCache::new(config.icon_cache_capacity())),
        IconPolicy::new(config.icon_bearing()),
        events.sender(),
        NavOptions {
            collapse_threshold: config.collapse_threshold(),
            editor: config.editor().to_string(),
        },
    );
    nav.mount_sidebar();
    nav.navigate(config.start_path().unwrap_or(""));

    panes.apply_initial(restored);
    let mut app = App::new(
        nav,
        panes,
        persistence,
        Box::new(SystemClipboard::default()),
        config.resize_step(),
    );

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize => {}
            Event::Nav(event) => app.handle_nav(event),
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown().await;
    tui.restore()?;
    info!("exiting");
    Ok(())
}
