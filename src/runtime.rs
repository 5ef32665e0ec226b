use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::clients::desktop::DesktopPlatform;
use crate::config::SchedulerConfig;
use crate::service::icon_resolver::{DirectoryAssetBundle, IconResolver};
use crate::service::scheduler::NotificationScheduler;

pub struct Runtime {
    pub scheduler: Arc<NotificationScheduler>,
    pub platform: Arc<DesktopPlatform>,
}

/// Wires the desktop platform, bundled icons and scheduler together and runs
/// one-time initialization.
pub async fn start(config: SchedulerConfig) -> Runtime {
    let platform = Arc::new(DesktopPlatform::notify_rust(config.permission_granted));
    let icons = IconResolver::new(
        Box::new(DirectoryAssetBundle::new(config.asset_dir.clone())),
        config.attachment_dir.clone(),
    );
    let scheduler = Arc::new(NotificationScheduler::new(platform.clone(), icons, config));
    scheduler.initialize().await;
    Runtime {
        scheduler,
        platform,
    }
}

impl Runtime {
    /// Returns once every scheduled timer has fired, or on Ctrl-C.
    pub async fn wait_for_pending(&self) {
        let registry = self.platform.registry();
        tokio::select! {
            _ = async {
                while !registry.is_idle() {
                    sleep(Duration::from_millis(500)).await;
                }
            } => info!("all scheduled notifications delivered"),
            _ = tokio::signal::ctrl_c() => {
                info!(
                    pending = ?registry.pending_ids(),
                    "interrupted; dropping pending notifications"
                );
            }
        }
    }
}
