//! Narrow capability interface over an embeddable player widget
//!
//! The playback core only talks to these traits. Concrete widgets adapt
//! their own command and event surface to them at the boundary.

use std::sync::Arc;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player bootstrap failed: {0}")]
    Bootstrap(String),
    #[error("player IPC failed: {0}")]
    Ipc(#[from] std::io::Error),
    #[error("player rejected command '{command}': {reason}")]
    Command { command: String, reason: String },
    #[error("player widget is not ready")]
    NotReady,
    #[error("player widget is not supported on this platform")]
    Unsupported,
}

/// Widget playback states, numbered like the embed API they mirror
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl WidgetState {
    pub fn code(self) -> i32 {
        match self {
            WidgetState::Unstarted => -1,
            WidgetState::Ended => 0,
            WidgetState::Playing => 1,
            WidgetState::Paused => 2,
            WidgetState::Buffering => 3,
            WidgetState::Cued => 5,
        }
    }
}

/// Embed options; the host draws its own transport so controls and keyboard are off
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerVars {
    pub autoplay: bool,
    pub controls: bool,
    pub disablekb: bool,
    pub fs: bool,
    // Embed-page options with no mpv equivalent
    #[allow(dead_code)]
    pub enablejsapi: bool,
    #[allow(dead_code)]
    pub modestbranding: bool,
    #[allow(dead_code)]
    pub playsinline: bool,
    #[allow(dead_code)]
    pub rel: bool,
}

impl Default for PlayerVars {
    fn default() -> Self {
        Self {
            autoplay: true,
            controls: false,
            disablekb: true,
            enablejsapi: true,
            fs: false,
            modestbranding: true,
            playsinline: true,
            rel: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    pub width: u16,
    pub height: u16,
    pub video_id: Option<String>,
    pub player_vars: PlayerVars,
}

impl WidgetConfig {
    /// A zero-sized widget: audio only, nothing drawn
    pub fn hidden(video_id: &str) -> Self {
        Self {
            width: 0,
            height: 0,
            video_id: Some(video_id.to_string()),
            player_vars: PlayerVars::default(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Events a widget pushes to whoever constructed it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    Ready,
    StateChange(WidgetState),
}

pub type WidgetEventSender = mpsc::UnboundedSender<WidgetEvent>;

#[async_trait]
pub trait PlayerWidget: Send + Sync {
    async fn play_video(&self) -> Result<(), PlayerError>;
    async fn pause_video(&self) -> Result<(), PlayerError>;
    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<(), PlayerError>;
    async fn set_volume(&self, percent: u8) -> Result<(), PlayerError>;
    async fn get_current_time(&self) -> Result<f64, PlayerError>;
    async fn get_duration(&self) -> Result<f64, PlayerError>;
    async fn load_video_by_id(&self, video_id: &str) -> Result<(), PlayerError>;
    async fn destroy(&self) -> Result<(), PlayerError>;
}

/// Where widgets come from: a one-time bootstrap, then construction
#[async_trait]
pub trait WidgetBackend: Send + Sync {
    /// Bring up the widget runtime. Callers guard this so it runs once.
    async fn load_script(&self) -> Result<(), PlayerError>;

    async fn create_widget(
        &self,
        config: WidgetConfig,
        events: WidgetEventSender,
    ) -> Result<Arc<dyn PlayerWidget>, PlayerError>;
}
