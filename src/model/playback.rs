//! Playback-related types and state management

use crate::config::DEFAULT_VOLUME_PERCENT;
use super::content::Track;

/// Shared playback state owned by the application shell.
///
/// Presentation code only ever sees clones of this; every mutation goes
/// through the controller's transitions.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub progress_secs: f64,
    pub duration_secs: f64,
    pub volume_percent: u8,
    pub repeat_enabled: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::with_volume(DEFAULT_VOLUME_PERCENT)
    }
}

impl PlaybackState {
    pub fn with_volume(volume_percent: u8) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            progress_secs: 0.0,
            duration_secs: 0.0,
            volume_percent,
            repeat_enabled: false,
        }
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.id.as_str())
    }

    pub fn select_track(&mut self, track: Track) {
        self.current_track = Some(track);
        self.is_playing = true;
        self.progress_secs = 0.0;
    }

    /// Flip the play intent and return the new value
    pub fn toggle_playing(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Flip repeat and return the new value
    pub fn toggle_repeat(&mut self) -> bool {
        self.repeat_enabled = !self.repeat_enabled;
        self.repeat_enabled
    }

    pub fn update_progress(&mut self, time_secs: f64, duration_secs: f64) {
        self.progress_secs = time_secs;
        self.duration_secs = duration_secs;
    }
}
