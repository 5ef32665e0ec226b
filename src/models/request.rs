use chrono::DateTime;
use chrono_tz::Tz;

use super::notification::IconAttachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    Default,
    High,
    Max,
}

/// How strictly the platform should honour the requested instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    Exact,
    ExactAllowWhileIdle,
    Inexact,
}

/// Date/time components a schedule is matched against. When present the
/// platform repeats the notification whenever the components match again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeComponents {
    Time,
    DayOfWeekAndTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDetails {
    pub app_name: String,
    pub channel_id: String,
    pub channel_name: String,
    pub importance: Importance,
    pub category_identifier: Option<String>,
    pub thread_identifier: Option<String>,
    pub attachments: Vec<IconAttachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowRequest {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub details: NotificationDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub scheduled_at: DateTime<Tz>,
    pub details: NotificationDetails,
    pub schedule_mode: ScheduleMode,
    pub match_components: Option<DateTimeComponents>,
}

impl ScheduleRequest {
    /// The alert emitted when this schedule fires.
    pub fn to_show_request(&self) -> ShowRequest {
        ShowRequest {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            details: self.details.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializationSettings {
    pub app_name: String,
    pub request_permissions: bool,
}
