use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recipient address for price-drop alerts.
pub const NOTIFICATION_EMAIL: &str = "notification_email";

/// Keys accepted by the settings endpoint.
pub const KNOWN_SETTINGS: &[&str] = &[NOTIFICATION_EMAIL];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
}

impl SystemSetting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_known_key(key: &str) -> bool {
        KNOWN_SETTINGS.contains(&key)
    }
}
