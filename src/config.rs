use std::env;

/// Controller configuration with tunable thresholds and intervals.
///
/// Defaults mirror the backend's expectations: the confidence threshold
/// must match the one the inference service was tuned for.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Base URL of the camera/inference backend.
    pub base_url: String,

    /// Minimum confidence (percent, 0-100) for a sample to count toward
    /// a stable detection.
    pub confidence_threshold: f64,

    /// Milliseconds between prediction polls while the camera runs.
    pub poll_interval_ms: u64,

    /// Consecutive at-threshold detections required before a gesture
    /// commits to the transcript.
    pub min_stable_detections: u32,

    /// Milliseconds between connectivity health checks.
    pub health_check_interval_ms: u64,

    /// Per-request timeout for backend calls.
    pub request_timeout_ms: u64,

    /// Speech playback rate.
    pub speaking_rate: f32,

    /// Speech playback pitch.
    pub speaking_pitch: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            confidence_threshold: 70.0,
            poll_interval_ms: 300,
            min_stable_detections: 3,
            health_check_interval_ms: 5000,
            request_timeout_ms: 10_000,
            speaking_rate: 1.0,
            speaking_pitch: 1.0,
        }
    }
}

impl ControllerConfig {
    /// Build a config from the environment, falling back to defaults.
    /// Only the knobs that make sense to override at launch are read.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("SIGNFLOW_BACKEND_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Some(value) = parse_env("SIGNFLOW_POLL_INTERVAL_MS") {
            config.poll_interval_ms = value;
        }
        if let Some(value) = parse_env("SIGNFLOW_HEALTH_INTERVAL_MS") {
            config.health_check_interval_ms = value;
        }

        config
    }
}

fn parse_env(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_backend_tuning() {
        let config = ControllerConfig::default();
        assert_eq!(config.confidence_threshold, 70.0);
        assert_eq!(config.poll_interval_ms, 300);
        assert_eq!(config.min_stable_detections, 3);
        assert_eq!(config.health_check_interval_ms, 5000);
        assert_eq!(config.speaking_rate, 1.0);
        assert_eq!(config.speaking_pitch, 1.0);
    }
}
