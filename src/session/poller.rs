use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::GestureBackend;
use crate::debounce::GestureLexicon;
use crate::notify::Notification;

use super::events::UiEvent;
use super::state::ControllerState;

/// Prediction poll loop, armed only while the session runs.
///
/// Each tick asks the backend for its latest prediction; a failed
/// request skips the tick silently and the next tick simply tries
/// again. The `generation` tag guards against late responses: once the
/// session leaves the generation this loop was armed under, nothing it
/// fetched is applied.
pub async fn prediction_loop(
    backend: GestureBackend,
    state: Arc<Mutex<ControllerState>>,
    lexicon: GestureLexicon,
    events: UnboundedSender<UiEvent>,
    poll_interval: Duration,
    generation: u64,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sample = match backend.latest_prediction().await {
                    Ok(Some(sample)) => sample,
                    // Nothing in frame yet; keep the display as-is.
                    Ok(None) => continue,
                    Err(err) => {
                        debug!("prediction poll failed, retrying next tick: {err:#}");
                        continue;
                    }
                };

                let mut guard = state.lock().await;
                if !guard.accepts_poll(generation) {
                    debug!("discarding stale prediction (generation {generation})");
                    break;
                }

                guard.record_prediction(&sample.label, sample.confidence);
                let _ = events.send(UiEvent::Prediction {
                    label: sample.label.clone(),
                    confidence: sample.confidence,
                });

                let committed = guard.detector.observe(&sample);
                let Some(label) = committed else {
                    continue;
                };

                match lexicon.fragment(&label) {
                    Some(fragment) => {
                        guard.append_fragment(fragment);
                        let transcript = guard.transcript.clone();
                        drop(guard);

                        let _ = events.send(UiEvent::TranscriptAppended {
                            fragment: fragment.to_string(),
                            transcript,
                        });
                        let _ = events.send(UiEvent::Notice(Notification::info(format!(
                            "Added: {}",
                            fragment.trim()
                        ))));
                    }
                    None => {
                        debug!("stable gesture '{label}' has no text mapping");
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("prediction poller shutting down (generation {generation})");
                break;
            }
        }
    }
}
