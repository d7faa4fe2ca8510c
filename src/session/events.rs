use serde::Serialize;

use crate::notify::Notification;

/// Everything the controller reports to whatever renders it. Shipped
/// over an unbounded channel; payloads serialize to camelCase JSON for
/// frontends that want them verbatim.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    Connection { connected: bool },
    Camera { running: bool },
    Prediction { label: String, confidence: f64 },
    TranscriptAppended { fragment: String, transcript: String },
    TranscriptCleared,
    Notice(Notification),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = UiEvent::Prediction {
            label: "Hi".into(),
            confidence: 92.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "prediction");
        assert_eq!(json["label"], "Hi");
        assert_eq!(json["confidence"], 92.5);
    }
}
