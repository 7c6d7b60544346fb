//! Playback state transitions
//!
//! Every transition updates the model first and then forwards a command to
//! the adapter without waiting for the widget to acknowledge it.

use crate::model::Track;
use crate::player::WidgetState;
use crate::view::{seek_target, volume_step};

use super::AppController;

const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: i16 = 5;

impl AppController {
    pub async fn select_track(&self, track: Track) {
        tracing::info!(video_id = %track.id, title = %track.title, "Track selected");
        let video_id = track.id.clone();
        self.model.select_track(track).await;

        if let Err(e) = self.player.load(&video_id, true).await {
            tracing::error!(error = %e, video_id = %video_id, "Failed to load track");
            self.model.set_playing(false).await;
            self.model.set_error(Self::format_player_error(&e)).await;
        }
    }

    pub async fn toggle_play_pause(&self) {
        let is_playing = self.model.toggle_playing().await;
        tracing::debug!(is_playing, "Toggling playback");
        self.player.set_playing(is_playing).await;
    }

    pub async fn seek(&self, time_secs: f64) {
        tracing::debug!(time_secs, "Seeking");
        self.model.set_progress(time_secs).await;
        self.player.seek(time_secs).await;
    }

    /// Stores and forwards the value as given; range limits belong to the slider
    pub async fn set_volume(&self, volume: u8) {
        tracing::debug!(volume, "Setting volume");
        self.model.set_volume(volume).await;
        self.player.set_volume(volume).await;
    }

    pub async fn toggle_repeat(&self) {
        let repeat = self.model.toggle_repeat().await;
        tracing::info!(repeat, "Repeat toggled");
        self.player.set_repeat(repeat).await;
    }

    pub async fn on_adapter_progress(&self, time_secs: f64, duration_secs: f64) {
        tracing::trace!(time_secs, duration_secs, "Progress");
        self.model.update_progress(time_secs, duration_secs).await;
    }

    /// Mirror widget-driven state changes into the play flag.
    ///
    /// Restarting on repeat is the adapter's job; nothing is re-issued here.
    pub async fn on_adapter_state_changed(&self, state: WidgetState) {
        match state {
            WidgetState::Playing => self.model.set_playing(true).await,
            WidgetState::Paused => self.model.set_playing(false).await,
            WidgetState::Ended => {
                if !self.model.is_repeat_enabled().await {
                    tracing::debug!("Track ended");
                    self.model.set_playing(false).await;
                }
            }
            _ => {}
        }
    }

    pub async fn seek_relative(&self, forward: bool) {
        let state = self.model.get_playback_state().await;
        if state.current_track.is_none() {
            return;
        }
        let delta = if forward { SEEK_STEP_SECS } else { -SEEK_STEP_SECS };
        let target = seek_target(state.progress_secs, delta, state.duration_secs);
        self.seek(target).await;
    }

    pub async fn volume_up(&self) {
        let current = self.model.get_playback_state().await.volume_percent;
        self.set_volume(volume_step(current, VOLUME_STEP)).await;
    }

    pub async fn volume_down(&self) {
        let current = self.model.get_playback_state().await.volume_percent;
        self.set_volume(volume_step(current, -VOLUME_STEP)).await;
    }
}
