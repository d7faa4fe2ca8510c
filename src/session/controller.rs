use std::sync::Arc;

use anyhow::{bail, Result};
use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::GestureBackend;
use crate::config::ControllerConfig;
use crate::debounce::GestureLexicon;
use crate::notify::Notification;
use crate::output::{ClipboardSink, SpeechService, Utterance};

use super::events::UiEvent;
use super::poller::prediction_loop;
use super::state::{ControllerState, SessionState};

struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the whole session: connectivity, camera start/stop, the
/// prediction poller, and the transcript utilities. Clone handles
/// share the same state.
#[derive(Clone)]
pub struct SessionController {
    config: ControllerConfig,
    backend: GestureBackend,
    lexicon: GestureLexicon,
    state: Arc<Mutex<ControllerState>>,
    poller: Arc<Mutex<Option<PollerHandle>>>,
    events: UnboundedSender<UiEvent>,
    clipboard: Arc<Mutex<Box<dyn ClipboardSink>>>,
    speech: Arc<Mutex<Box<dyn SpeechService>>>,
}

impl SessionController {
    pub fn new(
        config: ControllerConfig,
        events: UnboundedSender<UiEvent>,
        clipboard: Box<dyn ClipboardSink>,
        speech: Box<dyn SpeechService>,
    ) -> Result<Self> {
        let backend = GestureBackend::new(&config)?;
        let state = ControllerState::new(&config);

        Ok(Self {
            config,
            backend,
            lexicon: GestureLexicon::default(),
            state: Arc::new(Mutex::new(state)),
            poller: Arc::new(Mutex::new(None)),
            events,
            clipboard: Arc::new(Mutex::new(clipboard)),
            speech: Arc::new(Mutex::new(speech)),
        })
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.lock().await.session
    }

    pub async fn transcript(&self) -> String {
        self.state.lock().await.transcript.clone()
    }

    /// Replace the transcript wholesale (the result buffer is an
    /// editable string as far as the frontend cares).
    pub async fn set_transcript(&self, text: String) {
        let mut guard = self.state.lock().await;
        guard.transcript = text;
    }

    /// Repeating connectivity probe. Runs at a fixed period until the
    /// shutdown token fires, regardless of how often it fails.
    pub async fn run_health_loop(&self, shutdown: CancellationToken) {
        let mut ticker = interval(Duration::from_millis(self.config.health_check_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_health().await;
                }
                _ = shutdown.cancelled() => {
                    info!("health loop shutting down");
                    break;
                }
            }
        }
    }

    /// One connectivity probe. Success mirrors the server's running
    /// flag; failure escalates to Disconnected and kills the poller.
    pub async fn check_health(&self) {
        match self.backend.camera_status().await {
            Ok(status) => {
                let (was_connected, must_disarm) = {
                    let mut guard = self.state.lock().await;
                    let was_connected = guard.is_connected();
                    let must_disarm = guard.apply_health(status.running);
                    (was_connected, must_disarm)
                };

                if must_disarm {
                    self.disarm_poller().await;
                }
                if !was_connected {
                    info!("backend connection established");
                    self.emit(UiEvent::Connection { connected: true });
                }
                self.emit(UiEvent::Camera {
                    running: status.running,
                });
            }
            Err(err) => {
                warn!("health check failed: {err:#}");
                let (was_connected, must_disarm) = {
                    let mut guard = self.state.lock().await;
                    let was_connected = guard.is_connected();
                    let must_disarm = guard.apply_disconnect();
                    (was_connected, must_disarm)
                };

                if must_disarm {
                    self.disarm_poller().await;
                }
                if was_connected {
                    self.emit(UiEvent::Connection { connected: false });
                }
            }
        }
    }

    /// Start the camera. Only valid from a connected, idle session.
    pub async fn start(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            if !guard.is_connected() {
                drop(guard);
                self.notify(Notification::error("Server is not connected"));
                return Ok(());
            }
            if guard.is_running() {
                bail!("camera already running");
            }
            if guard.request_in_flight {
                bail!("another camera request is in flight");
            }
            guard.request_in_flight = true;
        }

        let result = self.backend.start_camera().await;

        let mut guard = self.state.lock().await;
        guard.request_in_flight = false;
        match result {
            Ok(response) if response.success => {
                let generation = guard.start_succeeded();
                drop(guard);

                self.arm_poller(generation).await;
                self.emit(UiEvent::Camera { running: true });
                self.notify(Notification::success("Camera started successfully"));
            }
            Ok(response) => {
                drop(guard);
                self.notify(Notification::error(format!(
                    "Failed to start camera: {}",
                    response.message_or("unknown error")
                )));
            }
            Err(err) => {
                drop(guard);
                warn!("start request failed: {err:#}");
                self.notify(Notification::error("Error starting camera"));
            }
        }

        Ok(())
    }

    /// Stop the camera. On failure the session stays running; the
    /// next health check will reconcile with the server either way.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            if !guard.is_connected() {
                drop(guard);
                self.notify(Notification::error("Server is not connected"));
                return Ok(());
            }
            if !guard.is_running() {
                bail!("camera is not running");
            }
            if guard.request_in_flight {
                bail!("another camera request is in flight");
            }
            guard.request_in_flight = true;
        }

        let result = self.backend.stop_camera().await;

        let mut guard = self.state.lock().await;
        guard.request_in_flight = false;
        match result {
            Ok(response) if response.success => {
                guard.stop_succeeded();
                drop(guard);

                self.disarm_poller().await;
                self.emit(UiEvent::Camera { running: false });
                self.emit(UiEvent::Prediction {
                    label: String::new(),
                    confidence: 0.0,
                });
                self.notify(Notification::success("Camera stopped successfully"));
            }
            Ok(response) => {
                drop(guard);
                self.notify(Notification::error(format!(
                    "Failed to stop camera: {}",
                    response.message_or("unknown error")
                )));
            }
            Err(err) => {
                drop(guard);
                warn!("stop request failed: {err:#}");
                self.notify(Notification::error("Error stopping camera"));
            }
        }

        Ok(())
    }

    /// The hosting surface went hidden. Stop a running camera without
    /// user-visible feedback and remember that we did.
    pub async fn surface_hidden(&self) {
        if !self.state.lock().await.is_running() {
            return;
        }

        match self.backend.stop_camera().await {
            Ok(response) if response.success => {
                self.state.lock().await.engage_auto_pause();
                self.disarm_poller().await;
                info!("auto-paused while surface hidden");
            }
            Ok(response) => {
                warn!(
                    "auto-pause stop rejected: {}",
                    response.message_or("unknown error")
                );
            }
            Err(err) => {
                warn!("auto-pause stop failed: {err:#}");
            }
        }
    }

    /// The hosting surface is visible again. Resume once if we
    /// auto-paused; a failed resume leaves the session stopped.
    pub async fn surface_visible(&self) {
        if !self.state.lock().await.auto_paused {
            return;
        }

        match self.backend.start_camera().await {
            Ok(response) if response.success => {
                let generation = self.state.lock().await.resume_from_auto_pause();
                self.arm_poller(generation).await;
                info!("auto-pause resumed");
            }
            Ok(response) => {
                // One attempt only; the user can start manually.
                self.state.lock().await.auto_paused = false;
                warn!(
                    "auto-pause resume rejected: {}",
                    response.message_or("unknown error")
                );
            }
            Err(err) => {
                self.state.lock().await.auto_paused = false;
                warn!("auto-pause resume failed: {err:#}");
            }
        }
    }

    pub async fn clear_transcript(&self) {
        self.state.lock().await.clear_transcript();
        self.emit(UiEvent::TranscriptCleared);
        self.notify(Notification::info("Text cleared"));
    }

    pub async fn copy_transcript(&self) {
        let text = self.transcript().await;
        if text.trim().is_empty() {
            self.notify(Notification::warning("Nothing to copy"));
            return;
        }

        let result = self.clipboard.lock().await.copy_text(&text);
        match result {
            Ok(()) => self.notify(Notification::success("Text copied to clipboard")),
            Err(err) => {
                warn!("clipboard copy failed: {err:#}");
                self.notify(Notification::error("Failed to copy text"));
            }
        }
    }

    pub async fn speak_transcript(&self) {
        let text = self.transcript().await;
        if text.trim().is_empty() {
            self.notify(Notification::warning("Nothing to speak"));
            return;
        }

        let mut speech = self.speech.lock().await;
        if !speech.available() {
            self.notify(Notification::warning("Speech synthesis is not available"));
            return;
        }

        let utterance = Utterance {
            text,
            rate: self.config.speaking_rate,
            pitch: self.config.speaking_pitch,
        };
        match speech.speak(utterance) {
            Ok(()) => self.notify(Notification::info("Speaking...")),
            Err(err) => {
                warn!("speech synthesis failed: {err:#}");
                self.notify(Notification::error("Speech synthesis error"));
            }
        }
    }

    async fn arm_poller(&self, generation: u64) {
        let mut slot = self.poller.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            previous.task.abort();
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(prediction_loop(
            self.backend.clone(),
            self.state.clone(),
            self.lexicon.clone(),
            self.events.clone(),
            Duration::from_millis(self.config.poll_interval_ms),
            generation,
            cancel.clone(),
        ));

        *slot = Some(PollerHandle { cancel, task });
    }

    async fn disarm_poller(&self) {
        if let Some(handle) = self.poller.lock().await.take() {
            handle.cancel.cancel();
            handle.task.abort();
        }
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }

    fn notify(&self, notification: Notification) {
        self.emit(UiEvent::Notice(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLevel;
    use crate::output::test_support::{RecordingClipboard, RecordingSpeech};
    use crate::output::UnavailableSpeech;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    fn controller_with(
        clipboard: Box<dyn ClipboardSink>,
        speech: Box<dyn SpeechService>,
    ) -> (SessionController, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = SessionController::new(ControllerConfig::default(), tx, clipboard, speech)
            .expect("controller should build");
        (controller, rx)
    }

    fn next_notice(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Notification {
        match rx.try_recv().expect("expected an event") {
            UiEvent::Notice(notice) => notice,
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn copy_with_empty_transcript_warns() {
        let (controller, mut rx) = controller_with(
            Box::new(RecordingClipboard::default()),
            Box::new(RecordingSpeech::default()),
        );

        controller.copy_transcript().await;

        let notice = next_notice(&mut rx);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Nothing to copy");
    }

    #[tokio::test]
    async fn copy_sends_transcript_to_clipboard() {
        let (controller, mut rx) = controller_with(
            Box::new(RecordingClipboard::default()),
            Box::new(RecordingSpeech::default()),
        );
        controller.set_transcript("Hello You ".into()).await;

        controller.copy_transcript().await;

        let notice = next_notice(&mut rx);
        assert_eq!(notice.level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn speak_without_engine_warns() {
        let (controller, mut rx) = controller_with(
            Box::new(RecordingClipboard::default()),
            Box::new(UnavailableSpeech),
        );
        controller.set_transcript("Hello ".into()).await;

        controller.speak_transcript().await;

        let notice = next_notice(&mut rx);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Speech synthesis is not available");
    }

    #[tokio::test]
    async fn clear_emits_event_and_notice() {
        let (controller, mut rx) = controller_with(
            Box::new(RecordingClipboard::default()),
            Box::new(RecordingSpeech::default()),
        );
        controller.set_transcript("Hello ".into()).await;

        controller.clear_transcript().await;

        assert_eq!(controller.transcript().await, "");
        assert_eq!(rx.try_recv().unwrap(), UiEvent::TranscriptCleared);
        let notice = next_notice(&mut rx);
        assert_eq!(notice.message, "Text cleared");
    }

    #[tokio::test]
    async fn start_while_disconnected_surfaces_error() {
        let (controller, mut rx) = controller_with(
            Box::new(RecordingClipboard::default()),
            Box::new(RecordingSpeech::default()),
        );

        controller.start().await.unwrap();

        assert_eq!(controller.session_state().await, SessionState::Disconnected);
        let notice = next_notice(&mut rx);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Server is not connected");
    }
}
