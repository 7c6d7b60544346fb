//! In-memory widget used by the adapter and controller tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use super::widget::{
    PlayerError, PlayerWidget, WidgetBackend, WidgetConfig, WidgetEvent, WidgetEventSender,
};

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetCommand {
    Play,
    Pause,
    Seek(f64, bool),
    Volume(u8),
    Load(String),
    GetTime,
    Destroy,
}

#[derive(Default)]
struct Shared {
    commands: Mutex<Vec<WidgetCommand>>,
    position: Mutex<(f64, f64)>,
    fail_queries: AtomicBool,
}

#[derive(Default)]
pub struct FakeBackend {
    shared: Arc<Shared>,
    script_loads: AtomicUsize,
    configs: Mutex<Vec<WidgetConfig>>,
    events: Mutex<Option<WidgetEventSender>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn emit(&self, event: WidgetEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn commands(&self) -> Vec<WidgetCommand> {
        self.shared.commands.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&WidgetCommand) -> bool) -> usize {
        self.commands().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_commands(&self) {
        self.shared.commands.lock().unwrap().clear();
    }

    pub fn script_loads(&self) -> usize {
        self.script_loads.load(Ordering::SeqCst)
    }

    pub fn widgets_created(&self) -> usize {
        self.configs.lock().unwrap().len()
    }

    pub fn configs(&self) -> Vec<WidgetConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn set_position(&self, time: f64, duration: f64) {
        *self.shared.position.lock().unwrap() = (time, duration);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.shared.fail_queries.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl WidgetBackend for FakeBackend {
    async fn load_script(&self) -> Result<(), PlayerError> {
        self.script_loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_widget(
        &self,
        config: WidgetConfig,
        events: WidgetEventSender,
    ) -> Result<Arc<dyn PlayerWidget>, PlayerError> {
        self.configs.lock().unwrap().push(config);
        *self.events.lock().unwrap() = Some(events);
        Ok(Arc::new(FakeWidget {
            shared: self.shared.clone(),
        }))
    }
}

struct FakeWidget {
    shared: Arc<Shared>,
}

impl FakeWidget {
    fn record(&self, command: WidgetCommand) {
        self.shared.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl PlayerWidget for FakeWidget {
    async fn play_video(&self) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Play);
        Ok(())
    }

    async fn pause_video(&self) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Pause);
        Ok(())
    }

    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Seek(seconds, allow_seek_ahead));
        Ok(())
    }

    async fn set_volume(&self, percent: u8) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Volume(percent));
        Ok(())
    }

    async fn get_current_time(&self) -> Result<f64, PlayerError> {
        self.record(WidgetCommand::GetTime);
        if self.shared.fail_queries.load(Ordering::SeqCst) {
            return Err(PlayerError::NotReady);
        }
        Ok(self.shared.position.lock().unwrap().0)
    }

    async fn get_duration(&self) -> Result<f64, PlayerError> {
        if self.shared.fail_queries.load(Ordering::SeqCst) {
            return Err(PlayerError::NotReady);
        }
        Ok(self.shared.position.lock().unwrap().1)
    }

    async fn load_video_by_id(&self, video_id: &str) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Load(video_id.to_string()));
        Ok(())
    }

    async fn destroy(&self) -> Result<(), PlayerError> {
        self.record(WidgetCommand::Destroy);
        Ok(())
    }
}

/// Let spawned tasks drain their queues (time is paused in these tests)
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
