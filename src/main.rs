mod config;
mod controller;
mod logging;
mod model;
mod player;
mod router;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::Config;
use controller::AppController;
use model::{AppModel, PlaylistStore, UserStore, YoutubeClient};
use player::{MpvBackend, PlayerAdapter};
use router::Route;
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Tadow Player Starting ===");

    let config = Config::from_env()?;

    let users = UserStore::open(&config.data_dir)?;
    let playlists = PlaylistStore::open(&config.data_dir)?;
    let search = Arc::new(YoutubeClient::new(
        config.youtube_api_endpoint.clone(),
        config.youtube_api_key.clone(),
    ));

    // mpv is only spawned on the first play
    let backend = Arc::new(MpvBackend::new(config.mpv_path.clone()));
    let (player, player_events) = PlayerAdapter::new(backend.clone());
    player.set_volume(config.default_volume).await;

    let model = Arc::new(AppModel::new(config.default_volume));
    let controller = AppController::new(model.clone(), player.clone(), search, users, playlists);

    // Optional start page, e.g. `tadow-player /playlists`
    let start_route = match std::env::args().nth(1) {
        Some(path) => Route::parse(&path).unwrap_or_else(|| {
            tracing::warn!(path = %path, "Unknown start route, opening home");
            Route::Home
        }),
        None => Route::Home,
    };

    let listener = controller.start_player_event_listener(player_events);
    controller.restore_session(start_route).await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.dispose().await;
    backend.shutdown().await;
    listener.abort();

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Tadow Player shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> Result<()> {
    loop {
        // Auto-clear old errors (after 5 seconds)
        model.auto_clear_old_errors().await;

        let playback = model.get_playback_state().await;
        let ui_state = model.get_ui_state().await;
        let content_state = model.get_content_state().await;
        let should_quit = model.should_quit().await;

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        if should_quit {
            break;
        }

        // Short poll keeps the progress gauge moving
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::error!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
