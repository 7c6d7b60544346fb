//! mpv-backed player widget
//!
//! The backend runs one idle mpv process for the whole application and talks
//! to it over its JSON IPC socket. mpv's ytdl hook resolves the video ids.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex, OnceCell};

use super::widget::{
    PlayerError, PlayerWidget, WidgetBackend, WidgetConfig, WidgetEvent, WidgetEventSender,
    WidgetState,
};

const CONNECT_ATTEMPTS: u32 = 60;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

type IpcReader = Box<dyn AsyncRead + Send + Unpin>;
type IpcWriter = Box<dyn AsyncWrite + Send + Unpin>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;
type Subscriber = Arc<Mutex<Option<WidgetEventSender>>>;

/// Tracks enough mpv state to turn its events into widget states
#[derive(Debug, Default)]
pub struct MpvStateTracker {
    paused: bool,
    file_loaded: bool,
    eof: bool,
    /// Unpaused while parked at the end; mpv's re-pause must reach the shell
    resumed_at_eof: bool,
}

impl MpvStateTracker {
    pub fn apply(&mut self, message: &Value) -> Option<WidgetState> {
        let event = message.get("event")?.as_str()?;
        match event {
            "start-file" => {
                self.file_loaded = false;
                self.eof = false;
                self.resumed_at_eof = false;
                Some(WidgetState::Buffering)
            }
            "file-loaded" => {
                self.file_loaded = true;
                Some(if self.paused { WidgetState::Paused } else { WidgetState::Playing })
            }
            "end-file" => {
                self.file_loaded = false;
                match message.get("reason").and_then(Value::as_str) {
                    Some("error") => Some(WidgetState::Unstarted),
                    _ => None,
                }
            }
            "property-change" => {
                let name = message.get("name").and_then(Value::as_str)?;
                let data = message.get("data").and_then(Value::as_bool).unwrap_or(false);
                match name {
                    "pause" => {
                        self.paused = data;
                        if self.file_loaded && self.eof {
                            if !data {
                                self.resumed_at_eof = true;
                                return None;
                            }
                            return std::mem::take(&mut self.resumed_at_eof)
                                .then_some(WidgetState::Paused);
                        }
                        if !self.file_loaded {
                            return None;
                        }
                        Some(if data { WidgetState::Paused } else { WidgetState::Playing })
                    }
                    "eof-reached" => {
                        let newly_ended = data && !self.eof;
                        self.eof = data;
                        if !data {
                            self.resumed_at_eof = false;
                        }
                        newly_ended.then_some(WidgetState::Ended)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Command half of the IPC connection
struct MpvIpc {
    writer: Mutex<IpcWriter>,
    pending: Pending,
    subscriber: Subscriber,
    next_id: AtomicU64,
}

impl MpvIpc {
    fn start(reader: IpcReader, writer: IpcWriter) -> Arc<Self> {
        let ipc = Arc::new(Self {
            writer: Mutex::new(writer),
            pending: Arc::new(Mutex::new(HashMap::new())),
            subscriber: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        });

        let pending = ipc.pending.clone();
        let subscriber = ipc.subscriber.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            let mut tracker = MpvStateTracker::default();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "mpv IPC read failed");
                        break;
                    }
                };
                let Ok(message) = serde_json::from_str::<Value>(&line) else {
                    tracing::trace!(line, "Ignoring non-JSON mpv output");
                    continue;
                };

                if let Some(id) = message.get("request_id").and_then(Value::as_u64) {
                    if let Some(reply) = pending.lock().await.remove(&id) {
                        let _ = reply.send(message);
                    }
                    continue;
                }

                if let Some(state) = tracker.apply(&message) {
                    if let Some(tx) = subscriber.lock().await.as_ref() {
                        let _ = tx.send(WidgetEvent::StateChange(state));
                    }
                }
            }
            tracing::warn!("mpv IPC connection closed");
            pending.lock().await.clear();
        });

        ipc
    }

    async fn command(&self, args: Value) -> Result<Value, PlayerError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let mut payload = json!({ "command": args, "request_id": id }).to_string();
        payload.push('\n');
        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(payload.as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            self.pending.lock().await.remove(&id);
            return Err(PlayerError::Ipc(e));
        }

        let reply = match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                return Err(PlayerError::Ipc(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "mpv closed the connection",
                )));
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(PlayerError::Command {
                    command: args.to_string(),
                    reason: "timed out waiting for mpv".to_string(),
                });
            }
        };

        match reply.get("error").and_then(Value::as_str) {
            Some("success") => Ok(reply.get("data").cloned().unwrap_or(Value::Null)),
            other => Err(PlayerError::Command {
                command: args.to_string(),
                reason: other.unwrap_or("no status").to_string(),
            }),
        }
    }

    async fn get_f64(&self, property: &str) -> Result<f64, PlayerError> {
        let data = self.command(json!(["get_property", property])).await?;
        data.as_f64().ok_or_else(|| PlayerError::Command {
            command: format!("get_property {property}"),
            reason: format!("not a number: {data}"),
        })
    }
}

#[cfg(unix)]
async fn connect(path: &std::path::Path) -> std::io::Result<(IpcReader, IpcWriter)> {
    let stream = tokio::net::UnixStream::connect(path).await?;
    let (reader, writer) = stream.into_split();
    Ok((Box::new(reader), Box::new(writer)))
}

#[cfg(not(unix))]
async fn connect(_path: &std::path::Path) -> std::io::Result<(IpcReader, IpcWriter)> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "mpv IPC needs a Unix socket",
    ))
}

pub struct MpvBackend {
    mpv_path: String,
    socket_path: PathBuf,
    child: Mutex<Option<Child>>,
    ipc: OnceCell<Arc<MpvIpc>>,
}

impl MpvBackend {
    pub fn new(mpv_path: impl Into<String>) -> Self {
        let socket_path = std::env::temp_dir()
            .join(format!("tadow-player-mpv-{}.sock", std::process::id()));
        Self {
            mpv_path: mpv_path.into(),
            socket_path,
            child: Mutex::new(None),
            ipc: OnceCell::new(),
        }
    }

    async fn spawn_and_connect(&self) -> Result<Arc<MpvIpc>, PlayerError> {
        if cfg!(not(unix)) {
            return Err(PlayerError::Unsupported);
        }
        let _ = std::fs::remove_file(&self.socket_path);

        tracing::info!(mpv = %self.mpv_path, socket = %self.socket_path.display(), "Launching mpv");
        let mut child = Command::new(&self.mpv_path)
            .arg("--idle=yes")
            .arg("--keep-open=yes")
            .arg("--ytdl=yes")
            .arg("--no-terminal")
            .arg("--no-input-default-bindings")
            .arg("--input-vo-keyboard=no")
            .arg("--osc=no")
            .arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PlayerError::Bootstrap(format!(
                    "failed to launch {}: {e}. Is mpv installed and on PATH?",
                    self.mpv_path
                ))
            })?;

        for _ in 0..CONNECT_ATTEMPTS {
            tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            match connect(&self.socket_path).await {
                Ok((reader, writer)) => {
                    tracing::info!("mpv IPC connected");
                    *self.child.lock().await = Some(child);
                    return Ok(MpvIpc::start(reader, writer));
                }
                Err(_) => {
                    if let Ok(Some(status)) = child.try_wait() {
                        return Err(PlayerError::Bootstrap(format!(
                            "mpv exited before IPC connected ({status})"
                        )));
                    }
                }
            }
        }

        let _ = child.kill().await;
        Err(PlayerError::Bootstrap(
            "timed out connecting to mpv IPC".to_string(),
        ))
    }

    /// Quit mpv; called once on application exit
    pub async fn shutdown(&self) {
        if let Some(ipc) = self.ipc.get() {
            let result = ipc.command(json!(["quit"])).await;
            crate::log_widget_result!("quit", result);
        }
        if let Some(mut child) = self.child.lock().await.take() {
            let _ = child.kill().await;
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

#[async_trait]
impl WidgetBackend for MpvBackend {
    async fn load_script(&self) -> Result<(), PlayerError> {
        self.ipc
            .get_or_try_init(|| self.spawn_and_connect())
            .await
            .map(|_| ())
    }

    async fn create_widget(
        &self,
        config: WidgetConfig,
        events: WidgetEventSender,
    ) -> Result<Arc<dyn PlayerWidget>, PlayerError> {
        let ipc = self.ipc.get().cloned().ok_or(PlayerError::NotReady)?;
        *ipc.subscriber.lock().await = Some(events.clone());

        if config.is_hidden() {
            ipc.command(json!(["set_property", "vid", "no"])).await?;
        }
        let vars = &config.player_vars;
        ipc.command(json!(["set_property", "fullscreen", vars.fs])).await?;
        // Best effort; older mpv builds refuse these at runtime
        let result = ipc.command(json!(["set_property", "osc", vars.controls])).await;
        crate::log_widget_result!("set osc", result);
        let result = ipc
            .command(json!(["set_property", "input-default-bindings", !vars.disablekb]))
            .await;
        crate::log_widget_result!("set input-default-bindings", result);
        ipc.command(json!(["set_property", "pause", !vars.autoplay])).await?;
        ipc.command(json!(["observe_property", 1, "pause"])).await?;
        ipc.command(json!(["observe_property", 2, "eof-reached"])).await?;

        let widget = MpvWidget { ipc };
        let _ = events.send(WidgetEvent::Ready);

        if let Some(video_id) = &config.video_id {
            widget.load_video_by_id(video_id).await?;
        }
        Ok(Arc::new(widget))
    }
}

struct MpvWidget {
    ipc: Arc<MpvIpc>,
}

#[async_trait]
impl PlayerWidget for MpvWidget {
    /// Like the embed API, playing an ended video starts it over
    async fn play_video(&self) -> Result<(), PlayerError> {
        let at_end = self
            .ipc
            .command(json!(["get_property", "eof-reached"]))
            .await?
            .as_bool()
            .unwrap_or(false);
        if at_end {
            tracing::debug!("Playing from the end, rewinding first");
            self.ipc.command(json!(["seek", 0.0, "absolute"])).await?;
        }
        self.ipc.command(json!(["set_property", "pause", false])).await.map(|_| ())
    }

    async fn pause_video(&self) -> Result<(), PlayerError> {
        self.ipc.command(json!(["set_property", "pause", true])).await.map(|_| ())
    }

    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<(), PlayerError> {
        let flags = if allow_seek_ahead { "absolute" } else { "absolute+keyframes" };
        self.ipc.command(json!(["seek", seconds, flags])).await.map(|_| ())
    }

    async fn set_volume(&self, percent: u8) -> Result<(), PlayerError> {
        self.ipc.command(json!(["set_property", "volume", percent])).await.map(|_| ())
    }

    async fn get_current_time(&self) -> Result<f64, PlayerError> {
        self.ipc.get_f64("time-pos").await
    }

    async fn get_duration(&self) -> Result<f64, PlayerError> {
        self.ipc.get_f64("duration").await
    }

    async fn load_video_by_id(&self, video_id: &str) -> Result<(), PlayerError> {
        let url = format!("{WATCH_URL}{video_id}");
        self.ipc.command(json!(["loadfile", url, "replace"])).await.map(|_| ())
    }

    async fn destroy(&self) -> Result<(), PlayerError> {
        *self.ipc.subscriber.lock().await = None;
        self.ipc.command(json!(["stop"])).await.map(|_| ())
    }
}
