//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::router::Route;
use super::types::{ActiveSection, AuthForm, UiState};
use super::playback::PlaybackState;
use super::content::{clamp_index, ContentState, FormMessage, ProfileField, Track};
use super::playlists::Playlist;

const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Main application model containing all state
pub struct AppModel {
    playback: Arc<Mutex<PlaybackState>>,
    ui_state: Arc<Mutex<UiState>>,
    content_state: Arc<Mutex<ContentState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(default_volume: u8) -> Self {
        Self {
            playback: Arc::new(Mutex::new(PlaybackState::with_volume(default_volume))),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Playback State
    // ========================================================================

    pub async fn get_playback_state(&self) -> PlaybackState {
        self.playback.lock().await.clone()
    }

    pub async fn select_track(&self, track: Track) {
        self.playback.lock().await.select_track(track);
    }

    pub async fn toggle_playing(&self) -> bool {
        self.playback.lock().await.toggle_playing()
    }

    pub async fn set_playing(&self, is_playing: bool) {
        self.playback.lock().await.is_playing = is_playing;
    }

    pub async fn is_playing(&self) -> bool {
        self.playback.lock().await.is_playing
    }

    pub async fn update_progress(&self, time_secs: f64, duration_secs: f64) {
        self.playback.lock().await.update_progress(time_secs, duration_secs);
    }

    pub async fn set_progress(&self, time_secs: f64) {
        self.playback.lock().await.progress_secs = time_secs;
    }

    pub async fn set_volume(&self, volume: u8) {
        self.playback.lock().await.volume_percent = volume;
    }

    pub async fn toggle_repeat(&self) -> bool {
        self.playback.lock().await.toggle_repeat()
    }

    pub async fn is_repeat_enabled(&self) -> bool {
        self.playback.lock().await.repeat_enabled
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Navigation & Session
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn route(&self) -> Route {
        self.ui_state.lock().await.route
    }

    pub async fn set_route(&self, route: Route) {
        let mut state = self.ui_state.lock().await;
        if state.route != route {
            state.auth_form = AuthForm::default();
        }
        state.route = route;
        state.active_section = match route {
            Route::Home => ActiveSection::Search,
            _ => ActiveSection::MainContent,
        };
    }

    pub async fn set_user_name(&self, name: Option<String>) {
        self.ui_state.lock().await.user_name = name;
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn toggle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.toggle();
    }

    // ========================================================================
    // Search input
    // ========================================================================

    pub async fn update_search_query(&self, query: String) {
        self.ui_state.lock().await.search_query = query;
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    // ========================================================================
    // Login / register form
    // ========================================================================

    pub async fn auth_form_input(&self, c: char) {
        self.ui_state.lock().await.auth_form.focused_value_mut().push(c);
    }

    pub async fn auth_form_backspace(&self) {
        self.ui_state.lock().await.auth_form.focused_value_mut().pop();
    }

    pub async fn auth_form_next_field(&self) {
        let mut state = self.ui_state.lock().await;
        state.auth_form.focused = state.auth_form.focused.next();
    }

    pub async fn set_auth_error(&self, error: Option<String>) {
        self.ui_state.lock().await.auth_form.error = error;
    }

    // ========================================================================
    // Error overlay & help
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(ts) = state.error_timestamp {
            if ts.elapsed() >= ERROR_DISPLAY_DURATION {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Content: search results
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_searching(&self, searching: bool) {
        self.content_state.lock().await.is_searching = searching;
    }

    pub async fn replace_search_results(&self, results: Vec<Track>) {
        self.content_state.lock().await.replace_results(results);
    }

    pub async fn get_selected_result(&self) -> Option<Track> {
        self.content_state.lock().await.selected_result().cloned()
    }

    pub async fn results_move_up(&self) {
        let mut content = self.content_state.lock().await;
        content.results_selected = content.results_selected.saturating_sub(1);
    }

    pub async fn results_move_down(&self) {
        let mut content = self.content_state.lock().await;
        let len = content.search_results.len();
        content.results_selected = clamp_index(content.results_selected + 1, len);
    }

    // ========================================================================
    // Content: playlists
    // ========================================================================

    pub async fn set_playlists(&self, playlists: Vec<Playlist>) {
        self.content_state.lock().await.set_playlists(playlists);
    }

    pub async fn get_selected_playlist(&self) -> Option<Playlist> {
        self.content_state.lock().await.selected_playlist().cloned()
    }

    pub async fn playlist_move_up(&self) {
        let mut content = self.content_state.lock().await;
        content.playlist_selected = content.playlist_selected.saturating_sub(1);
    }

    pub async fn playlist_move_down(&self) {
        let mut content = self.content_state.lock().await;
        let len = content.playlists.len();
        content.playlist_selected = clamp_index(content.playlist_selected + 1, len);
    }

    pub async fn open_playlist(&self, id: Option<Uuid>) {
        let mut content = self.content_state.lock().await;
        content.open_playlist = id;
        content.playlist_track_selected = 0;
    }

    pub async fn get_selected_playlist_track(&self) -> Option<(Uuid, Track)> {
        let content = self.content_state.lock().await;
        let id = content.open_playlist?;
        content.selected_playlist_track().cloned().map(|t| (id, t))
    }

    pub async fn playlist_track_move_up(&self) {
        let mut content = self.content_state.lock().await;
        content.playlist_track_selected = content.playlist_track_selected.saturating_sub(1);
    }

    pub async fn playlist_track_move_down(&self) {
        let mut content = self.content_state.lock().await;
        let len = content.current_playlist().map(|p| p.tracks.len()).unwrap_or(0);
        content.playlist_track_selected = clamp_index(content.playlist_track_selected + 1, len);
    }

    pub async fn start_new_playlist_prompt(&self) {
        self.content_state.lock().await.new_playlist_name = Some(String::new());
    }

    pub async fn is_new_playlist_prompt_open(&self) -> bool {
        self.content_state.lock().await.new_playlist_name.is_some()
    }

    pub async fn new_playlist_input(&self, c: char) {
        if let Some(name) = self.content_state.lock().await.new_playlist_name.as_mut() {
            name.push(c);
        }
    }

    pub async fn new_playlist_backspace(&self) {
        if let Some(name) = self.content_state.lock().await.new_playlist_name.as_mut() {
            name.pop();
        }
    }

    /// Close the prompt, returning what was typed
    pub async fn take_new_playlist_name(&self) -> Option<String> {
        self.content_state.lock().await.new_playlist_name.take()
    }

    // ========================================================================
    // Content: profile form
    // ========================================================================

    pub async fn reset_profile_form(&self, username: String) {
        let mut content = self.content_state.lock().await;
        content.profile.username = username;
        content.profile.password.clear();
        content.profile.focused = ProfileField::Username;
        content.profile.message = None;
    }

    pub async fn profile_input(&self, c: char) {
        let mut content = self.content_state.lock().await;
        match content.profile.focused {
            ProfileField::Username => content.profile.username.push(c),
            ProfileField::Password => content.profile.password.push(c),
        }
    }

    pub async fn profile_backspace(&self) {
        let mut content = self.content_state.lock().await;
        match content.profile.focused {
            ProfileField::Username => content.profile.username.pop(),
            ProfileField::Password => content.profile.password.pop(),
        };
    }

    pub async fn profile_next_field(&self) {
        let mut content = self.content_state.lock().await;
        content.profile.focused = match content.profile.focused {
            ProfileField::Username => ProfileField::Password,
            ProfileField::Password => ProfileField::Username,
        };
    }

    pub async fn set_profile_message(&self, message: Option<FormMessage>) {
        self.content_state.lock().await.profile.message = message;
    }

    pub async fn clear_profile_password(&self) {
        self.content_state.lock().await.profile.password.clear();
    }
}
