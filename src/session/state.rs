use serde::Serialize;

use crate::config::ControllerConfig;
use crate::debounce::StableDetector;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Backend unreachable; start/stop are disabled.
    Disconnected,
    /// Backend reachable, camera stopped.
    Idle,
    /// Camera running; the prediction poller may be armed.
    Running,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Disconnected
    }
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Idle => "idle",
            SessionState::Running => "running",
        }
    }
}

/// All mutable session state, owned by the controller behind one lock.
///
/// `poll_generation` tags each armed poller; it bumps on every
/// transition that invalidates outstanding polls, so a late
/// `/get_prediction` response from a previous run mutates nothing.
#[derive(Debug)]
pub struct ControllerState {
    pub session: SessionState,
    pub poll_generation: u64,
    pub auto_paused: bool,
    pub request_in_flight: bool,
    pub detector: StableDetector,
    pub transcript: String,
    pub displayed_label: String,
    pub displayed_confidence: f64,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            session: SessionState::Disconnected,
            poll_generation: 0,
            auto_paused: false,
            request_in_flight: false,
            detector: StableDetector::new(
                config.confidence_threshold,
                config.min_stable_detections,
            ),
            transcript: String::new(),
            displayed_label: String::new(),
            displayed_confidence: 0.0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session != SessionState::Disconnected
    }

    pub fn is_running(&self) -> bool {
        self.session == SessionState::Running
    }

    /// Health check succeeded; mirror the server's running flag.
    /// Returns true when an armed poller must be disarmed (the server
    /// stopped the camera out from under us). Never arms the poller:
    /// only an explicit start does that.
    pub fn apply_health(&mut self, running: bool) -> bool {
        let was_running = self.is_running();
        self.session = if running {
            SessionState::Running
        } else {
            SessionState::Idle
        };

        if was_running && !running {
            self.invalidate_polls();
            return true;
        }
        false
    }

    /// Health check failed; the backend is unreachable.
    /// Returns true when an armed poller must be disarmed.
    pub fn apply_disconnect(&mut self) -> bool {
        let was_running = self.is_running();
        self.session = SessionState::Disconnected;
        self.invalidate_polls();
        was_running
    }

    /// Start request succeeded. Returns the generation the new poller
    /// must carry.
    pub fn start_succeeded(&mut self) -> u64 {
        self.session = SessionState::Running;
        self.invalidate_polls();
        self.poll_generation
    }

    /// Stop request succeeded: back to idle with a clean detector and
    /// zeroed confidence display.
    pub fn stop_succeeded(&mut self) {
        self.session = SessionState::Idle;
        self.invalidate_polls();
        self.detector.reset();
        self.displayed_label.clear();
        self.displayed_confidence = 0.0;
    }

    /// A poll result may only be applied while its generation is
    /// current and the session still runs.
    pub fn accepts_poll(&self, generation: u64) -> bool {
        self.is_running() && self.poll_generation == generation
    }

    /// The hosting surface went hidden while running: camera stopped
    /// silently, remember to resume when it comes back.
    pub fn engage_auto_pause(&mut self) {
        self.session = SessionState::Idle;
        self.invalidate_polls();
        self.auto_paused = true;
    }

    /// Auto-pause resume succeeded. Returns the new poller generation.
    pub fn resume_from_auto_pause(&mut self) -> u64 {
        self.auto_paused = false;
        self.start_succeeded()
    }

    pub fn record_prediction(&mut self, label: &str, confidence: f64) {
        self.displayed_label = label.to_string();
        self.displayed_confidence = confidence;
    }

    pub fn append_fragment(&mut self, fragment: &str) {
        self.transcript.push_str(fragment);
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    fn invalidate_polls(&mut self) {
        self.poll_generation = self.poll_generation.wrapping_add(1);
    }
}
