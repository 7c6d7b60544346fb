//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use crate::router::Route;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = &self.model;

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        match ui_state.route {
            Route::Login | Route::Register => return self.handle_auth_key(key, ui_state.route).await,
            Route::Profile => {
                if self.handle_profile_key(key).await {
                    return Ok(());
                }
            }
            _ => {}
        }

        // New playlist name prompt captures text
        if model.is_new_playlist_prompt_open().await {
            match key.code {
                KeyCode::Enter => {
                    if let Some(name) = model.take_new_playlist_name().await {
                        self.create_playlist(&name).await;
                    }
                }
                KeyCode::Esc => {
                    model.take_new_playlist_name().await;
                }
                KeyCode::Backspace => model.new_playlist_backspace().await,
                KeyCode::Char(c) => model.new_playlist_input(c).await,
                _ => {}
            }
            return Ok(());
        }

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab => {
                    model.toggle_section().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    self.spawn_search(ui_state.search_query.clone());
                    model.set_active_section(ActiveSection::MainContent).await;
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        if ui_state.active_section == ActiveSection::MainContent
            && self.handle_content_key(key, ui_state.route).await
        {
            return Ok(());
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if ui_state.route == Route::Home {
                    model.toggle_section().await;
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => self.toggle_play_pause().await,
            KeyCode::Char('r') | KeyCode::Char('R') => self.toggle_repeat().await,
            KeyCode::Char('+') | KeyCode::Char('=') => self.volume_up().await,
            KeyCode::Char('-') => self.volume_down().await,
            KeyCode::Left => self.seek_relative(false).await,
            KeyCode::Right => self.seek_relative(true).await,
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Char('/') => {
                self.navigate(Route::Home).await;
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Char('1') => self.navigate(Route::Home).await,
            KeyCode::Char('2') => self.navigate(Route::Playlists).await,
            KeyCode::Char('3') => self.navigate(Route::Profile).await,
            KeyCode::Char('o') | KeyCode::Char('O') => self.logout().await,
            KeyCode::Char('h') | KeyCode::Char('H') => model.show_help_popup().await,
            _ => {}
        }
        Ok(())
    }

    async fn handle_auth_key(&self, key: KeyEvent, route: Route) -> Result<()> {
        let model = &self.model;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if ctrl => self.navigate(Route::Register).await,
            KeyCode::Char('l') if ctrl => self.navigate(Route::Login).await,
            KeyCode::Tab | KeyCode::BackTab => model.auth_form_next_field().await,
            KeyCode::Enter => self.submit_auth_form().await,
            KeyCode::Esc => {
                if route == Route::Register {
                    self.navigate(Route::Login).await;
                } else {
                    model.set_should_quit(true).await;
                }
            }
            KeyCode::Backspace => model.auth_form_backspace().await,
            KeyCode::Char(c) => model.auth_form_input(c).await,
            _ => {}
        }
        Ok(())
    }

    /// Profile form takes text input; returns false for keys it leaves to the globals
    async fn handle_profile_key(&self, key: KeyEvent) -> bool {
        let model = &self.model;
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => model.profile_next_field().await,
            KeyCode::Enter => self.submit_profile_field().await,
            KeyCode::Esc => self.navigate(Route::Home).await,
            KeyCode::Backspace => model.profile_backspace().await,
            KeyCode::Char(c) => model.profile_input(c).await,
            _ => return false,
        }
        true
    }

    /// Per-page list keys; returns false when the key is not a page key
    async fn handle_content_key(&self, key: KeyEvent, route: Route) -> bool {
        let model = &self.model;
        match (route, key.code) {
            (Route::Home, KeyCode::Up) => model.results_move_up().await,
            (Route::Home, KeyCode::Down) => model.results_move_down().await,
            (Route::Home, KeyCode::Enter) => {
                if let Some(track) = model.get_selected_result().await {
                    self.select_track(track).await;
                }
            }
            (Route::Home, KeyCode::Char('a') | KeyCode::Char('A')) => {
                self.add_selected_result_to_playlist().await;
            }

            (Route::Playlists, KeyCode::Up) => model.playlist_move_up().await,
            (Route::Playlists, KeyCode::Down) => model.playlist_move_down().await,
            (Route::Playlists, KeyCode::Enter) => self.open_selected_playlist().await,
            (Route::Playlists, KeyCode::Char('n') | KeyCode::Char('N')) => {
                model.start_new_playlist_prompt().await;
            }
            (Route::Playlists, KeyCode::Char('d') | KeyCode::Char('D')) => {
                self.delete_selected_playlist().await;
            }
            (Route::Playlists, KeyCode::Esc) => self.navigate(Route::Home).await,

            (Route::Playlist(_), KeyCode::Up) => model.playlist_track_move_up().await,
            (Route::Playlist(_), KeyCode::Down) => model.playlist_track_move_down().await,
            (Route::Playlist(_), KeyCode::Enter) => self.play_selected_playlist_track().await,
            (Route::Playlist(_), KeyCode::Char('d') | KeyCode::Char('D')) => {
                self.remove_selected_playlist_track().await;
            }
            (Route::Playlist(_), KeyCode::Esc | KeyCode::Backspace) => {
                self.navigate(Route::Playlists).await;
            }
            _ => return false,
        }
        true
    }
}
