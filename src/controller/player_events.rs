//! Player event listener for adapter progress and state events

use tokio::task::JoinHandle;

use crate::player::{PlayerEvent, PlayerEventChannel};
use super::AppController;

impl AppController {
    /// Apply adapter events to the model in arrival order
    pub fn start_player_event_listener(&self, mut events: PlayerEventChannel) -> JoinHandle<()> {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match event {
                    PlayerEvent::Progress { time, duration } => {
                        controller.on_adapter_progress(time, duration).await;
                    }
                    PlayerEvent::StateChanged(state) => {
                        tracing::debug!(state = state.code(), "PlayerEvent::StateChanged");
                        controller.on_adapter_state_changed(state).await;
                    }
                }
            }
        })
    }
}
