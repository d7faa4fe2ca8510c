use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a notification stays visible before auto-dismissing.
pub const NOTIFICATION_TTL_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, purely presentational status message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            issued_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::milliseconds(NOTIFICATION_TTL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_notification_is_not_expired() {
        let notice = Notification::info("camera started");
        assert!(!notice.is_expired(notice.issued_at));
        assert!(!notice.is_expired(notice.issued_at + Duration::milliseconds(2999)));
    }

    #[test]
    fn notification_expires_after_ttl() {
        let notice = Notification::warning("nothing to copy");
        assert!(notice.is_expired(notice.issued_at + Duration::milliseconds(3000)));
        assert!(notice.is_expired(notice.issued_at + Duration::seconds(10)));
    }

    #[test]
    fn serializes_level_as_camel_case() {
        let notice = Notification::new(NoticeLevel::Error, "boom");
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
    }
}
