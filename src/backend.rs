use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::ControllerConfig;
use crate::debounce::PredictionSample;

/// `GET /check_camera_status` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraStatus {
    pub running: bool,
}

/// `GET /start_camera` and `GET /stop_camera` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ControlResponse {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// `GET /get_prediction` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default)]
    pub prediction: Option<PredictionPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionPayload {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f64,
}

impl From<PredictionPayload> for PredictionSample {
    fn from(payload: PredictionPayload) -> Self {
        PredictionSample {
            label: payload.label,
            confidence: payload.confidence,
        }
    }
}

/// HTTP client for the camera/inference backend. Cheap to clone; the
/// underlying reqwest client pools connections internally.
#[derive(Debug, Clone)]
pub struct GestureBackend {
    client: reqwest::Client,
    base_url: String,
}

impl GestureBackend {
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Probe the backend. Any transport error or non-2xx response is a
    /// connection failure as far as the session state machine cares.
    pub async fn camera_status(&self) -> Result<CameraStatus> {
        let url = format!("{}/check_camera_status", self.base_url);
        let status = self
            .client
            .get(&url)
            .send()
            .await
            .context("camera status request failed")?
            .error_for_status()
            .context("camera status returned an error status")?
            .json::<CameraStatus>()
            .await
            .context("camera status payload malformed")?;
        Ok(status)
    }

    pub async fn start_camera(&self) -> Result<ControlResponse> {
        self.control("start_camera").await
    }

    pub async fn stop_camera(&self) -> Result<ControlResponse> {
        self.control("stop_camera").await
    }

    /// Fetch the latest prediction. `Ok(None)` means the backend had
    /// nothing to report this tick (no hand in frame yet).
    pub async fn latest_prediction(&self) -> Result<Option<PredictionSample>> {
        let url = format!("{}/get_prediction", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("prediction request failed")?
            .error_for_status()
            .context("prediction returned an error status")?
            .json::<PredictionResponse>()
            .await
            .context("prediction payload malformed")?;

        if !response.success {
            return Ok(None);
        }
        Ok(response.prediction.map(PredictionSample::from))
    }

    async fn control(&self, endpoint: &str) -> Result<ControlResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("{endpoint} request failed"))?
            .error_for_status()
            .with_context(|| format!("{endpoint} returned an error status"))?
            .json::<ControlResponse>()
            .await
            .with_context(|| format!("{endpoint} payload malformed"))?;
        Ok(response)
    }
}
