use async_trait::async_trait;

use crate::error::PlatformError;
use crate::models::request::{InitializationSettings, ScheduleRequest, ShowRequest};

/// The host's local notification service.
///
/// Implementations own the only shared notification registry; a schedule for
/// an id that is already registered replaces the earlier one.
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Safe to call more than once.
    async fn initialize(&self, settings: &InitializationSettings) -> Result<(), PlatformError>;

    async fn request_permissions(&self) -> Result<bool, PlatformError>;

    async fn show(&self, request: ShowRequest) -> Result<(), PlatformError>;

    async fn zoned_schedule(&self, request: ScheduleRequest) -> Result<(), PlatformError>;
}
