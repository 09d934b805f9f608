//! Push notifications.

use chrono::{DateTime, Utc};
use edge_core::NotificationConfig;
use serde::{Deserialize, Serialize};

/// Vibration pattern for every notification, in milliseconds.
pub const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// Action id that opens the site.
pub const ACTION_EXPLORE: &str = "explore";

/// Action id that only dismisses.
pub const ACTION_CLOSE: &str = "close";

/// Fields read from a push message. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub body: Option<String>,
}

impl PushPayload {
    /// Parse a push message body.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// A button on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Data attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Notification handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification for a push payload received at `now`.
    pub fn from_push(config: &NotificationConfig, payload: PushPayload, now: DateTime<Utc>) -> Self {
        Self {
            title: config.site_name.clone(),
            body: payload
                .body
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| config.default_body.clone()),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            data: NotificationData {
                date_of_arrival: now.timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.to_string(),
                    title: config.explore_title.clone(),
                    icon: config.icon.clone(),
                },
                NotificationAction {
                    action: ACTION_CLOSE.to_string(),
                    title: "Close".to_string(),
                    icon: config.badge.clone(),
                },
            ],
        }
    }
}

/// A click on a displayed notification.
#[derive(Debug, Clone)]
pub struct NotificationClick {
    pub notification: Notification,
    /// Action button id, `None` for a click on the body.
    pub action: Option<String>,
}

impl NotificationClick {
    pub fn new(notification: Notification, action: Option<&str>) -> Self {
        Self {
            notification,
            action: action.map(str::to_string),
        }
    }

    /// Whether the click should open the site.
    pub fn is_explore(&self) -> bool {
        self.action.as_deref() == Some(ACTION_EXPLORE)
    }
}
