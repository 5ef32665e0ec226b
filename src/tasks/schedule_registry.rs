use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::clients::desktop::AlertSender;
use crate::error::PlatformError;
use crate::models::request::{DateTimeComponents, ScheduleRequest};

/// Local instant for `date` at `time`. A time inside a DST gap moves forward
/// past the gap.
fn local_at(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

/// First instant strictly after `now` at which a schedule should fire.
///
/// Without components the schedule is one-shot and a past `scheduled_at`
/// yields `None`. With components the wall-clock time of day (and weekday for
/// `DayOfWeekAndTime`) of `scheduled_at` is matched against later dates.
pub fn next_fire_time(
    scheduled_at: DateTime<Tz>,
    now: DateTime<Utc>,
    components: Option<DateTimeComponents>,
) -> Option<DateTime<Tz>> {
    if scheduled_at > now {
        return Some(scheduled_at);
    }
    let components = components?;
    let tz = scheduled_at.timezone();
    let time = scheduled_at.time();
    let mut date = now.with_timezone(&tz).date_naive();
    let step = match components {
        DateTimeComponents::Time => 1,
        DateTimeComponents::DayOfWeekAndTime => {
            while date.weekday() != scheduled_at.weekday() {
                date = date.succ_opt()?;
            }
            7
        }
    };
    for _ in 0..3 {
        if let Some(candidate) = local_at(tz, date, time) {
            if candidate > now {
                return Some(candidate);
            }
        }
        date = date.checked_add_signed(Duration::days(step))?;
    }
    None
}

/// In-process timers standing in for the OS notification registry.
#[derive(Default)]
pub struct ScheduleRegistry {
    timers: Mutex<HashMap<i32, JoinHandle<()>>>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<S: AlertSender + 'static>(
        &self,
        request: ScheduleRequest,
        sender: Arc<S>,
    ) -> Result<(), PlatformError> {
        let now = Utc::now();
        let Some(first) = next_fire_time(request.scheduled_at, now, request.match_components)
        else {
            return Err(PlatformError::Schedule(format!(
                "scheduled date {} must be in the future",
                request.scheduled_at
            )));
        };
        let delay = (first.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or_default();
        let id = request.id;

        let mut timers = self
            .timers
            .lock()
            .map_err(|_| PlatformError::Schedule("schedule registry poisoned".to_string()))?;
        let handle = tokio::spawn(run_timer(request, first, Instant::now() + delay, sender));
        if let Some(previous) = timers.insert(id, handle) {
            previous.abort();
            debug!(id, "replaced existing schedule");
        }
        info!(id, fire_at = %first, "notification scheduled");
        Ok(())
    }

    /// Ids whose timers have not finished yet, in ascending order.
    pub fn pending_ids(&self) -> Vec<i32> {
        let Ok(mut timers) = self.timers.lock() else {
            return Vec::new();
        };
        timers.retain(|_, handle| !handle.is_finished());
        let mut ids: Vec<i32> = timers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_idle(&self) -> bool {
        self.pending_ids().is_empty()
    }
}

impl Drop for ScheduleRegistry {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.get_mut() {
            for handle in timers.values() {
                handle.abort();
            }
        }
    }
}

async fn run_timer<S: AlertSender + 'static>(
    request: ScheduleRequest,
    first: DateTime<Tz>,
    first_deadline: Instant,
    sender: Arc<S>,
) {
    let alert = request.to_show_request();
    let mut fire_at = first;
    let mut deadline = first_deadline;
    loop {
        sleep_until(deadline).await;
        if let Err(err) = sender.deliver(&alert).await {
            warn!(id = request.id, "Failed to deliver scheduled notification: {}", err);
        }
        // Match against the requested time of day, not the last firing,
        // which may have been shifted by a DST gap.
        let Some(next) = next_fire_time(
            request.scheduled_at,
            fire_at.with_timezone(&Utc),
            request.match_components,
        ) else {
            break;
        };
        let gap = (next - fire_at).to_std().unwrap_or_default();
        deadline += gap;
        fire_at = next;
        debug!(id = request.id, next = %fire_at, "re-armed recurring notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Tokyo;
    use chrono_tz::Europe::Berlin;
    use crate::models::request::{Importance, NotificationDetails, ScheduleMode, ShowRequest};

    struct CountingSender {
        sent: tokio::sync::Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl AlertSender for CountingSender {
        async fn deliver(&self, _alert: &ShowRequest) -> Result<(), PlatformError> {
            *self.sent.lock().await += 1;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn poisoned_registry_rejects_without_spawning() {
        let registry = Arc::new(ScheduleRegistry::new());
        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.timers.lock().unwrap();
            panic!("poison the registry");
        })
        .join();

        let sender = Arc::new(CountingSender {
            sent: tokio::sync::Mutex::new(0),
        });
        let request = ScheduleRequest {
            id: 8,
            title: "late".to_string(),
            body: "body".to_string(),
            scheduled_at: (Utc::now() + Duration::seconds(5)).with_timezone(&chrono_tz::UTC),
            details: NotificationDetails {
                app_name: "test".to_string(),
                channel_id: "c".to_string(),
                channel_name: "C".to_string(),
                importance: Importance::Default,
                category_identifier: None,
                thread_identifier: None,
                attachments: Vec::new(),
            },
            schedule_mode: ScheduleMode::Exact,
            match_components: None,
        };

        let err = registry.schedule(request, sender.clone()).unwrap_err();
        assert!(matches!(err, PlatformError::Schedule(_)));

        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(*sender.sent.lock().await, 0);
    }

    #[test]
    fn one_shot_in_future_is_kept() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        let at = Tokyo.with_ymd_and_hms(2026, 2, 10, 18, 0, 0).unwrap();
        assert_eq!(next_fire_time(at, now, None), Some(at));
    }

    #[test]
    fn one_shot_in_past_is_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let at = Tokyo.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap();
        assert_eq!(next_fire_time(at, now, None), None);
    }

    #[test]
    fn daily_rolls_to_next_matching_time_of_day() {
        // 21:00 Tokyo on the 10th
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let at = Tokyo.with_ymd_and_hms(2026, 2, 1, 7, 30, 0).unwrap();
        let next = next_fire_time(at, now, Some(DateTimeComponents::Time)).unwrap();
        assert_eq!(next, Tokyo.with_ymd_and_hms(2026, 2, 11, 7, 30, 0).unwrap());
    }

    #[test]
    fn weekly_matches_weekday() {
        // 2026-02-02 is a Monday.
        let at = Tokyo.with_ymd_and_hms(2026, 2, 2, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 4, 0, 0, 0).unwrap();
        let next = next_fire_time(at, now, Some(DateTimeComponents::DayOfWeekAndTime)).unwrap();
        assert_eq!(next, Tokyo.with_ymd_and_hms(2026, 2, 9, 9, 0, 0).unwrap());
    }

    #[test]
    fn daily_keeps_wall_clock_across_dst_change() {
        // Berlin switches to summer time on 2026-03-29.
        let at = Berlin.with_ymd_and_hms(2026, 3, 28, 8, 0, 0).unwrap();
        let next = next_fire_time(
            at,
            at.with_timezone(&Utc),
            Some(DateTimeComponents::Time),
        )
        .unwrap();
        assert_eq!(next, Berlin.with_ymd_and_hms(2026, 3, 29, 8, 0, 0).unwrap());
        assert_eq!((next - at).num_hours(), 23);
    }

    #[test]
    fn daily_inside_dst_gap_returns_to_requested_time() {
        // 02:30 does not exist in Berlin on 2026-03-29.
        let at = Berlin.with_ymd_and_hms(2026, 3, 28, 2, 30, 0).unwrap();
        let mut now = at.with_timezone(&Utc);
        let mut fired = Vec::new();
        for _ in 0..3 {
            let next = next_fire_time(at, now, Some(DateTimeComponents::Time)).unwrap();
            now = next.with_timezone(&Utc);
            fired.push(next);
        }
        assert_eq!(
            fired,
            vec![
                Berlin.with_ymd_and_hms(2026, 3, 29, 3, 30, 0).unwrap(),
                Berlin.with_ymd_and_hms(2026, 3, 30, 2, 30, 0).unwrap(),
                Berlin.with_ymd_and_hms(2026, 3, 31, 2, 30, 0).unwrap(),
            ]
        );
    }
}
