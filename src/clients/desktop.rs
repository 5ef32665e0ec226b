use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use notify_rust::Notification;
use tracing::{debug, info};

use super::platform::NotificationPlatform;
use crate::error::PlatformError;
use crate::models::request::{InitializationSettings, ScheduleRequest, ShowRequest};
use crate::tasks::schedule_registry::ScheduleRegistry;

/// Puts a single alert on screen.
#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn deliver(&self, alert: &ShowRequest) -> Result<(), PlatformError>;
}

/// Desktop notifications through the freedesktop/macOS/Windows backends of
/// `notify-rust`.
pub struct NotifyRustSender;

#[async_trait]
impl AlertSender for NotifyRustSender {
    async fn deliver(&self, alert: &ShowRequest) -> Result<(), PlatformError> {
        let alert = alert.clone();
        tokio::task::spawn_blocking(move || {
            let mut builder = Notification::new();
            builder
                .summary(&alert.title)
                .body(&alert.body)
                .appname(&alert.details.app_name);
            if let Some(attachment) = alert.details.attachments.first() {
                builder.icon(&attachment.file_path.to_string_lossy());
            }
            builder
                .show()
                .map(|_| ())
                .map_err(|e| PlatformError::Display(e.to_string()))
        })
        .await
        .map_err(|e| PlatformError::Display(e.to_string()))?
    }
}

pub struct DesktopPlatform<S: AlertSender + 'static = NotifyRustSender> {
    sender: Arc<S>,
    registry: ScheduleRegistry,
    permission_granted: bool,
    initialized: AtomicBool,
}

impl DesktopPlatform<NotifyRustSender> {
    pub fn notify_rust(permission_granted: bool) -> Self {
        Self::new(Arc::new(NotifyRustSender), permission_granted)
    }
}

impl<S: AlertSender + 'static> DesktopPlatform<S> {
    pub fn new(sender: Arc<S>, permission_granted: bool) -> Self {
        Self {
            sender,
            registry: ScheduleRegistry::new(),
            permission_granted,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ScheduleRegistry {
        &self.registry
    }

    fn ensure_ready(&self) -> Result<(), PlatformError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(PlatformError::NotInitialized);
        }
        if !self.permission_granted {
            return Err(PlatformError::PermissionDenied);
        }
        Ok(())
    }
}

#[async_trait]
impl<S: AlertSender + 'static> NotificationPlatform for DesktopPlatform<S> {
    async fn initialize(&self, settings: &InitializationSettings) -> Result<(), PlatformError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!(app = %settings.app_name, "desktop platform already initialized");
        } else {
            info!(app = %settings.app_name, "desktop platform initialized");
        }
        Ok(())
    }

    async fn request_permissions(&self) -> Result<bool, PlatformError> {
        Ok(self.permission_granted)
    }

    async fn show(&self, request: ShowRequest) -> Result<(), PlatformError> {
        self.ensure_ready()?;
        self.sender.deliver(&request).await
    }

    async fn zoned_schedule(&self, request: ScheduleRequest) -> Result<(), PlatformError> {
        self.ensure_ready()?;
        self.registry.schedule(request, self.sender.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{Importance, NotificationDetails};
    use tokio::sync::Mutex;

    struct MockSender {
        sent: Mutex<Vec<ShowRequest>>,
    }

    #[async_trait]
    impl AlertSender for MockSender {
        async fn deliver(&self, alert: &ShowRequest) -> Result<(), PlatformError> {
            self.sent.lock().await.push(alert.clone());
            Ok(())
        }
    }

    fn alert() -> ShowRequest {
        ShowRequest {
            id: 1,
            title: "Stretch".to_string(),
            body: "Five minutes".to_string(),
            details: NotificationDetails {
                app_name: "test".to_string(),
                channel_id: "c".to_string(),
                channel_name: "C".to_string(),
                importance: Importance::High,
                category_identifier: None,
                thread_identifier: None,
                attachments: Vec::new(),
            },
        }
    }

    fn settings() -> InitializationSettings {
        InitializationSettings {
            app_name: "test".to_string(),
            request_permissions: true,
        }
    }

    #[tokio::test]
    async fn show_requires_initialize() {
        let sender = Arc::new(MockSender {
            sent: Mutex::new(Vec::new()),
        });
        let platform = DesktopPlatform::new(sender.clone(), true);

        let err = platform.show(alert()).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotInitialized));

        platform.initialize(&settings()).await.unwrap();
        platform.show(alert()).await.unwrap();
        assert_eq!(sender.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn denied_permission_blocks_delivery() {
        let sender = Arc::new(MockSender {
            sent: Mutex::new(Vec::new()),
        });
        let platform = DesktopPlatform::new(sender.clone(), false);
        platform.initialize(&settings()).await.unwrap();

        assert!(!platform.request_permissions().await.unwrap());
        let err = platform.show(alert()).await.unwrap_err();
        assert!(matches!(err, PlatformError::PermissionDenied));
        assert!(sender.sent.lock().await.is_empty());
    }
}
