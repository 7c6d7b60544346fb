//! Bridge between the shell's playback state and a player widget
//!
//! Lifecycle: `Uninitialized -> ScriptLoading -> WidgetReady -> {Playing <-> Paused} -> Ended`.
//! The adapter is the only owner of the widget and of the progress poller.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, OnceCell};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::DEFAULT_VOLUME_PERCENT;
use crate::log_widget_result;
use super::widget::{
    PlayerError, PlayerWidget, WidgetBackend, WidgetConfig, WidgetEvent, WidgetState,
};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Events the adapter reports up to the shell, in widget order
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEvent {
    Progress { time: f64, duration: f64 },
    StateChanged(WidgetState),
}

pub type PlayerEventChannel = mpsc::UnboundedReceiver<PlayerEvent>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    ScriptLoading,
    WidgetReady,
    Playing,
    Paused,
    Ended,
}

struct AdapterInner {
    lifecycle: Lifecycle,
    widget: Option<Arc<dyn PlayerWidget>>,
    initialized: bool,
    play_intent: bool,
    repeat: bool,
    volume: u8,
    poller: Option<JoinHandle<()>>,
    event_task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct PlayerAdapter {
    backend: Arc<dyn WidgetBackend>,
    script: Arc<OnceCell<()>>,
    inner: Arc<Mutex<AdapterInner>>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl PlayerAdapter {
    pub fn new(backend: Arc<dyn WidgetBackend>) -> (Self, PlayerEventChannel) {
        let (events, rx) = mpsc::unbounded_channel();
        let adapter = Self {
            backend,
            script: Arc::new(OnceCell::new()),
            inner: Arc::new(Mutex::new(AdapterInner {
                lifecycle: Lifecycle::Uninitialized,
                widget: None,
                initialized: false,
                play_intent: false,
                repeat: false,
                volume: DEFAULT_VOLUME_PERCENT,
                poller: None,
                event_task: None,
            })),
            events,
        };
        (adapter, rx)
    }

    #[cfg(test)]
    pub(crate) async fn lifecycle(&self) -> Lifecycle {
        self.inner.lock().await.lifecycle
    }

    #[cfg(test)]
    pub(crate) async fn is_polling(&self) -> bool {
        self.inner
            .lock()
            .await
            .poller
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Bootstrap the backend (once per adapter lifetime) and construct the widget
    pub async fn mount(&self, video_id: &str, play_intent: bool) -> Result<(), PlayerError> {
        let mut inner = self.inner.lock().await;
        inner.play_intent = play_intent;
        if inner.initialized {
            return Ok(());
        }
        inner.lifecycle = Lifecycle::ScriptLoading;

        let backend = self.backend.clone();
        let bootstrap = self
            .script
            .get_or_try_init(|| async move {
                tracing::info!("Loading player widget runtime");
                backend.load_script().await
            })
            .await;
        if let Err(e) = bootstrap {
            tracing::error!(error = %e, "Player widget runtime failed to load");
            inner.lifecycle = Lifecycle::Uninitialized;
            return Err(e);
        }

        let (widget_tx, widget_rx) = mpsc::unbounded_channel();
        let widget = match self
            .backend
            .create_widget(WidgetConfig::hidden(video_id), widget_tx)
            .await
        {
            Ok(widget) => widget,
            Err(e) => {
                tracing::error!(error = %e, "Player widget construction failed");
                inner.lifecycle = Lifecycle::Uninitialized;
                return Err(e);
            }
        };

        inner.widget = Some(widget);
        inner.initialized = true;

        let adapter = self.clone();
        let mut widget_rx = widget_rx;
        inner.event_task = Some(tokio::spawn(async move {
            while let Some(event) = widget_rx.recv().await {
                adapter.handle_widget_event(event).await;
            }
            tracing::debug!("Widget event stream closed");
        }));

        tracing::info!(video_id, play_intent, "Player widget constructed");
        Ok(())
    }

    /// Switch tracks; reuses the widget when one exists
    pub async fn load(&self, video_id: &str, play_intent: bool) -> Result<(), PlayerError> {
        let (widget, lifecycle) = {
            let mut inner = self.inner.lock().await;
            inner.play_intent = play_intent;
            (inner.widget.clone(), inner.lifecycle)
        };

        match widget {
            Some(widget) => {
                tracing::debug!(video_id, ?lifecycle, "Loading video into existing widget");
                let result = widget.load_video_by_id(video_id).await;
                log_widget_result!("loadVideoById", result);
                result?;
                if play_intent {
                    let result = widget.play_video().await;
                    log_widget_result!("playVideo", result);
                }
                Ok(())
            }
            None => self.mount(video_id, play_intent).await,
        }
    }

    pub async fn set_playing(&self, playing: bool) {
        let widget = {
            let mut inner = self.inner.lock().await;
            inner.play_intent = playing;
            inner.widget.clone()
        };
        if let Some(widget) = widget {
            if playing {
                let result = widget.play_video().await;
                log_widget_result!("playVideo", result);
            } else {
                let result = widget.pause_video().await;
                log_widget_result!("pauseVideo", result);
            }
        }
    }

    pub async fn seek(&self, seconds: f64) {
        let widget = self.inner.lock().await.widget.clone();
        if let Some(widget) = widget {
            let result = widget.seek_to(seconds, true).await;
            log_widget_result!("seekTo", result);
        }
    }

    pub async fn set_volume(&self, percent: u8) {
        let widget = {
            let mut inner = self.inner.lock().await;
            inner.volume = percent;
            inner.widget.clone()
        };
        if let Some(widget) = widget {
            let result = widget.set_volume(percent).await;
            log_widget_result!("setVolume", result);
        }
    }

    pub async fn set_repeat(&self, repeat: bool) {
        self.inner.lock().await.repeat = repeat;
    }

    /// Tear down the widget; a later `mount` constructs a fresh one
    pub async fn dispose(&self) {
        let mut inner = self.inner.lock().await;
        Self::stop_polling(&mut inner);
        if let Some(task) = inner.event_task.take() {
            task.abort();
        }
        if let Some(widget) = inner.widget.take() {
            let result = widget.destroy().await;
            log_widget_result!("destroy", result);
        }
        inner.initialized = false;
        inner.lifecycle = Lifecycle::Uninitialized;
        tracing::info!("Player widget disposed");
    }

    async fn handle_widget_event(&self, event: WidgetEvent) {
        match event {
            WidgetEvent::Ready => {
                let mut inner = self.inner.lock().await;
                inner.lifecycle = Lifecycle::WidgetReady;
                tracing::debug!(play_intent = inner.play_intent, "Player widget ready");
                let Some(widget) = inner.widget.clone() else {
                    return;
                };
                let volume = inner.volume;
                let play_intent = inner.play_intent;
                drop(inner);

                let result = widget.set_volume(volume).await;
                log_widget_result!("setVolume", result);
                if play_intent {
                    let result = widget.play_video().await;
                    log_widget_result!("playVideo", result);
                }
            }
            WidgetEvent::StateChange(state) => {
                tracing::debug!(state = state.code(), "Widget state changed");
                let _ = self.events.send(PlayerEvent::StateChanged(state));

                let mut inner = self.inner.lock().await;
                inner.lifecycle = match state {
                    WidgetState::Playing => Lifecycle::Playing,
                    WidgetState::Paused => Lifecycle::Paused,
                    WidgetState::Ended => Lifecycle::Ended,
                    _ => Lifecycle::WidgetReady,
                };

                if state == WidgetState::Playing {
                    self.start_polling(&mut inner);
                } else {
                    Self::stop_polling(&mut inner);
                }

                if state == WidgetState::Ended && inner.repeat {
                    let Some(widget) = inner.widget.clone() else {
                        return;
                    };
                    drop(inner);
                    tracing::info!("Track ended with repeat on, restarting");
                    let result = widget.seek_to(0.0, true).await;
                    log_widget_result!("seekTo", result);
                    let result = widget.play_video().await;
                    log_widget_result!("playVideo", result);
                }
            }
        }
    }

    fn start_polling(&self, inner: &mut AdapterInner) {
        Self::stop_polling(inner);
        let Some(widget) = inner.widget.clone() else {
            return;
        };
        let events = self.events.clone();

        inner.poller = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let polled = futures::future::try_join(
                    widget.get_current_time(),
                    widget.get_duration(),
                )
                .await;
                match polled {
                    Ok((time, duration)) => {
                        if events.send(PlayerEvent::Progress { time, duration }).is_err() {
                            break;
                        }
                    }
                    // Transient widget state, e.g. nothing loaded yet
                    Err(e) => tracing::warn!(error = %e, "Error getting player time"),
                }
            }
        }));
    }

    fn stop_polling(inner: &mut AdapterInner) {
        if let Some(poller) = inner.poller.take() {
            poller.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::testing::{settle, FakeBackend, WidgetCommand};

    fn progress_events(rx: &mut PlayerEventChannel) -> Vec<(f64, f64)> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PlayerEvent::Progress { time, duration } = event {
                out.push((time, duration));
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn mount_bootstraps_and_constructs_once() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());

        adapter.mount("first", true).await.unwrap();
        adapter.mount("first", true).await.unwrap();
        adapter.load("second", true).await.unwrap();

        assert_eq!(backend.script_loads(), 1);
        assert_eq!(backend.widgets_created(), 1);
        assert_eq!(backend.configs()[0].video_id.as_deref(), Some("first"));
        assert!(backend.commands().contains(&WidgetCommand::Load("second".to_string())));
        assert_eq!(adapter.lifecycle().await, Lifecycle::ScriptLoading);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_plays_when_intent_is_set() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.set_volume(55).await;
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::Ready);
        settle().await;

        assert_eq!(adapter.lifecycle().await, Lifecycle::WidgetReady);
        assert_eq!(
            backend.commands(),
            vec![WidgetCommand::Volume(55), WidgetCommand::Play]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ready_without_intent_stays_paused() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", false).await.unwrap();

        backend.emit(WidgetEvent::Ready);
        settle().await;

        assert_eq!(backend.count(|c| *c == WidgetCommand::Play), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_polled_every_second_while_playing() {
        let backend = FakeBackend::new();
        backend.set_position(12.0, 200.0);
        let (adapter, mut rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;
        assert!(adapter.is_polling().await);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(progress_events(&mut rx), vec![(12.0, 200.0); 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_playing_cancels_the_poller() {
        let backend = FakeBackend::new();
        let (adapter, mut rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(progress_events(&mut rx).len(), 2);

        backend.emit(WidgetEvent::StateChange(WidgetState::Paused));
        settle().await;
        assert!(!adapter.is_polling().await);
        assert_eq!(adapter.lifecycle().await, Lifecycle::Paused);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(progress_events(&mut rx).is_empty());
        assert_eq!(backend.count(|c| *c == WidgetCommand::GetTime), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reentering_playing_never_runs_two_pollers() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;
        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(backend.count(|c| *c == WidgetCommand::GetTime), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn query_errors_do_not_stop_polling() {
        let backend = FakeBackend::new();
        backend.set_position(5.0, 60.0);
        backend.fail_queries(true);
        let (adapter, mut rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(progress_events(&mut rx).is_empty());

        backend.fail_queries(false);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(progress_events(&mut rx), vec![(5.0, 60.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn ended_with_repeat_restarts_exactly_once() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();
        adapter.set_repeat(true).await;

        backend.emit(WidgetEvent::StateChange(WidgetState::Ended));
        settle().await;

        assert_eq!(
            backend.commands(),
            vec![WidgetCommand::Seek(0.0, true), WidgetCommand::Play]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ended_without_repeat_does_nothing() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();

        backend.emit(WidgetEvent::StateChange(WidgetState::Ended));
        settle().await;

        assert!(backend.commands().is_empty());
        assert_eq!(adapter.lifecycle().await, Lifecycle::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_tears_down_and_allows_remount() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());
        adapter.mount("abc", true).await.unwrap();
        backend.emit(WidgetEvent::StateChange(WidgetState::Playing));
        settle().await;

        adapter.dispose().await;
        assert!(!adapter.is_polling().await);
        assert_eq!(adapter.lifecycle().await, Lifecycle::Uninitialized);
        assert!(backend.commands().contains(&WidgetCommand::Destroy));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(backend.count(|c| *c == WidgetCommand::GetTime), 0);

        adapter.mount("def", true).await.unwrap();
        assert_eq!(backend.widgets_created(), 2);
        assert_eq!(backend.script_loads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_without_a_widget_are_ignored() {
        let backend = FakeBackend::new();
        let (adapter, _rx) = PlayerAdapter::new(backend.clone());

        adapter.set_playing(true).await;
        adapter.seek(10.0).await;
        adapter.set_volume(20).await;

        assert!(backend.commands().is_empty());
        assert_eq!(adapter.lifecycle().await, Lifecycle::Uninitialized);
    }
}
