//! Model module - Application state and data types
//!
//! - `types`: UI state (focus, forms, current route)
//! - `playback`: Playback state owned by the shell
//! - `content`: Tracks, search results, playlist and profile view data
//! - `store`: JSON file persistence helpers
//! - `users`: Local accounts and session
//! - `playlists`: Playlist store
//! - `youtube_client`: Video search client
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod content;
mod store;
mod users;
mod playlists;
mod youtube_client;
mod app_model;

pub use types::{ActiveSection, AuthField, UiState};

pub use playback::PlaybackState;

pub use content::{ContentState, FormMessage, ProfileField, Track};

pub use store::StoreError;
pub use users::UserStore;
pub use playlists::PlaylistStore;
pub use youtube_client::{SearchError, VideoSearch, YoutubeClient};

pub use app_model::AppModel;
