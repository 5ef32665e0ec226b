use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::clients::platform::NotificationPlatform;
use crate::config::SchedulerConfig;
use crate::models::notification::NotificationModel;
use crate::models::request::{
    Importance, InitializationSettings, NotificationDetails, ScheduleMode, ScheduleRequest,
    ShowRequest,
};
use crate::service::icon_resolver::IconResolver;

/// Converts an instant into the local zone. Wall-clock time of day in the
/// zone is what the platform matches against.
pub fn zoned_instant(scheduled_time: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    scheduled_time.with_timezone(&tz)
}

pub fn load_time_zone(name: &str) -> Tz {
    match Tz::from_str(name) {
        Ok(tz) => tz,
        Err(err) => {
            error!(timezone = name, "Unknown time zone, falling back to UTC: {}", err);
            Tz::UTC
        }
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    time_zone: Option<Tz>,
    permission_granted: bool,
}

/// One shared handle to the platform notification service. Construct once
/// and pass it (usually behind an `Arc`) to whatever needs to notify.
pub struct NotificationScheduler {
    platform: Arc<dyn NotificationPlatform>,
    icons: IconResolver,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
}

impl NotificationScheduler {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        icons: IconResolver,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            platform,
            icons,
            config,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    pub async fn initialize(&self) {
        let mut state = self.state.lock().await;
        if state.time_zone.is_some() {
            debug!("notification scheduler already initialized");
            return;
        }
        let tz = load_time_zone(&self.config.timezone);

        let settings = InitializationSettings {
            app_name: self.config.app_name.clone(),
            request_permissions: true,
        };
        if let Err(err) = self.platform.initialize(&settings).await {
            error!("Failed to initialize notification platform: {}", err);
            return;
        }
        state.permission_granted = match self.platform.request_permissions().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!("Failed to request notification permissions: {}", err);
                false
            }
        };
        if !state.permission_granted {
            warn!("Notification permission not granted; alerts will not be shown");
        }
        state.time_zone = Some(tz);
        info!(timezone = %tz, "notification scheduler ready");
    }

    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.time_zone.is_some()
    }

    pub async fn time_zone(&self) -> Option<Tz> {
        self.state.lock().await.time_zone
    }

    pub async fn permission_granted(&self) -> bool {
        self.state.lock().await.permission_granted
    }

    pub async fn show_notification(
        &self,
        id: i32,
        title: &str,
        body: &str,
        icon_name: Option<&str>,
    ) {
        if !self.is_ready().await {
            warn!(id, "show_notification called before initialize; skipping");
            return;
        }
        let request = ShowRequest {
            id,
            title: title.to_string(),
            body: body.to_string(),
            details: self.details(icon_name).await,
        };
        match self.platform.show(request).await {
            Ok(()) => info!(id, "notification shown"),
            Err(err) => error!(id, "Failed to show notification: {}", err),
        }
    }

    pub async fn schedule_notification(
        &self,
        id: i32,
        title: &str,
        body: &str,
        scheduled_time: DateTime<Utc>,
        icon_name: Option<&str>,
    ) {
        let Some(tz) = self.time_zone().await else {
            warn!(id, "schedule_notification called before initialize; skipping");
            return;
        };
        let request = ScheduleRequest {
            id,
            title: title.to_string(),
            body: body.to_string(),
            scheduled_at: zoned_instant(scheduled_time, tz),
            details: self.details(icon_name).await,
            schedule_mode: ScheduleMode::ExactAllowWhileIdle,
            match_components: self.config.repeat.match_components(),
        };
        match self.platform.zoned_schedule(request).await {
            Ok(()) => info!(id, at = %scheduled_time, "notification schedule requested"),
            Err(err) => error!(id, "Failed to schedule notification: {}", err),
        }
    }

    pub async fn show_model(&self, model: &NotificationModel) {
        self.show_notification(
            model.id,
            &model.title,
            &model.message,
            model.icon_name.as_deref(),
        )
        .await
    }

    pub async fn schedule_model(&self, model: &NotificationModel) {
        self.schedule_notification(
            model.id,
            &model.title,
            &model.message,
            model.scheduled_time,
            model.icon_name.as_deref(),
        )
        .await
    }

    async fn details(&self, icon_name: Option<&str>) -> NotificationDetails {
        let attachments = self.icons.resolve(icon_name).await.into_iter().collect();
        NotificationDetails {
            app_name: self.config.app_name.clone(),
            channel_id: self.config.channel_id.clone(),
            channel_name: self.config.channel_name.clone(),
            importance: Importance::High,
            category_identifier: Some(self.config.category_identifier.clone()),
            thread_identifier: Some(self.config.thread_identifier.clone()),
            attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn zoned_instant_preserves_local_time_of_day() {
        let tz = chrono_tz::Asia::Tokyo;
        let local = tz.with_ymd_and_hms(2026, 5, 1, 6, 45, 10).unwrap();
        let zoned = zoned_instant(local.with_timezone(&Utc), tz);
        assert_eq!(zoned.hour(), 6);
        assert_eq!(zoned.minute(), 45);
        assert_eq!(zoned.second(), 10);
        assert_eq!(zoned, local);
    }

    #[test]
    fn load_time_zone_falls_back_to_utc() {
        assert_eq!(load_time_zone("Asia/Tokyo"), chrono_tz::Asia::Tokyo);
        assert_eq!(load_time_zone("Mars/Olympus"), Tz::UTC);
    }
}
