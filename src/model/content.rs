//! Content view state and data structures for search results, playlists and the profile page

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::playlists::Playlist;

/// Page size of a search; results are never merged across searches
pub const SEARCH_PAGE_SIZE: usize = 10;

/// A playable video, normalized from a search response
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
}

/// Which profile form field has focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProfileField {
    #[default]
    Username,
    Password,
}

/// Inline feedback shown on a form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMessage {
    Success(String),
    Error(String),
}

/// Profile page form state
#[derive(Clone, Debug, Default)]
pub struct ProfileForm {
    pub username: String,
    pub password: String,
    pub focused: ProfileField,
    pub message: Option<FormMessage>,
}

/// Everything the main content area renders
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub search_results: Vec<Track>,
    pub results_selected: usize,
    pub is_searching: bool,
    pub playlists: Vec<Playlist>,
    pub playlist_selected: usize,
    pub open_playlist: Option<Uuid>,
    pub playlist_track_selected: usize,
    /// Name being typed for a new playlist, `Some` while the prompt is open
    pub new_playlist_name: Option<String>,
    pub profile: ProfileForm,
}

impl ContentState {
    pub fn replace_results(&mut self, results: Vec<Track>) {
        self.search_results = results;
        self.results_selected = 0;
        self.is_searching = false;
    }

    pub fn selected_result(&self) -> Option<&Track> {
        self.search_results.get(self.results_selected)
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.playlists.get(self.playlist_selected)
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        let id = self.open_playlist?;
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn selected_playlist_track(&self) -> Option<&Track> {
        self.current_playlist()?
            .tracks
            .get(self.playlist_track_selected)
    }

    /// Replace the playlist list and keep selections inside bounds
    pub fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
        self.playlist_selected = clamp_index(self.playlist_selected, self.playlists.len());
        let track_count = self.current_playlist().map(|p| p.tracks.len()).unwrap_or(0);
        self.playlist_track_selected = clamp_index(self.playlist_track_selected, track_count);
    }
}

pub fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}
