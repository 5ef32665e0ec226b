use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A notification as built by caller code before it is handed to the scheduler.
///
/// Values are never mutated in place; the `with_*` constructors return a
/// modified copy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NotificationModel {
    pub id: i32,
    pub title: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub icon_name: Option<String>,
}

impl NotificationModel {
    pub fn new(
        id: i32,
        title: impl Into<String>,
        message: impl Into<String>,
        scheduled_time: DateTime<Utc>,
        icon_name: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            message: message.into(),
            scheduled_time,
            icon_name,
        }
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    pub fn with_scheduled_time(&self, scheduled_time: DateTime<Utc>) -> Self {
        Self {
            scheduled_time,
            ..self.clone()
        }
    }

    pub fn with_icon_name(&self, icon_name: Option<String>) -> Self {
        Self {
            icon_name,
            ..self.clone()
        }
    }
}

/// Image file attached to a single notification request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IconAttachment {
    pub identifier: String,
    pub file_path: PathBuf,
}
