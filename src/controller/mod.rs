//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and owns every playback transition.
//!
//! - `input`: Key event handling
//! - `playback`: Playback state transitions forwarded to the player adapter
//! - `navigation`: Routes, search, session, playlists and profile
//! - `player_events`: Listener for adapter progress and state events

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;

use crate::model::{AppModel, PlaylistStore, StoreError, UserStore, VideoSearch};
use crate::player::{PlayerAdapter, PlayerError};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) player: PlayerAdapter,
    search: Arc<dyn VideoSearch>,
    users: UserStore,
    playlists: PlaylistStore,
}

impl AppController {
    pub fn new(
        model: Arc<AppModel>,
        player: PlayerAdapter,
        search: Arc<dyn VideoSearch>,
        users: UserStore,
        playlists: PlaylistStore,
    ) -> Self {
        Self {
            model,
            player,
            search,
            users,
            playlists,
        }
    }

    pub(crate) fn format_player_error(error: &PlayerError) -> String {
        match error {
            PlayerError::Bootstrap(reason) => format!("Player unavailable: {}", reason),
            PlayerError::Unsupported => "Playback is not supported on this platform.".to_string(),
            PlayerError::NotReady => "Player is still starting. Try again in a moment.".to_string(),
            other => format!("Playback error: {}", other),
        }
    }

    pub(crate) fn format_store_error(error: &StoreError) -> String {
        match error {
            StoreError::InvalidCredentials
            | StoreError::DuplicateUser(_)
            | StoreError::EmptyName
            | StoreError::NotAuthenticated => {
                let mut message = error.to_string();
                if let Some(first) = message.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                message
            }
            other => format!("Error: {}", other),
        }
    }
}
