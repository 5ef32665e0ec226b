use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::AssetError;
use crate::models::notification::IconAttachment;

pub const DEFAULT_ICON_ASSET: &str = "notification_icon.png";

const ICON_ASSETS: &[(&str, &str)] = &[
    ("alarm", "alarm_icon.png"),
    ("task", "task_icon.png"),
    ("meeting", "meeting_icon.png"),
    ("alert", "alert_icon.png"),
    ("test", "test_icon.png"),
    ("muscle", "muscle_icon.png"),
    ("training", "training_icon.png"),
];

/// Asset file for a symbolic icon name. Unknown or missing names map to the
/// default icon.
pub fn asset_name_for(icon_name: Option<&str>) -> &'static str {
    icon_name
        .and_then(|name| {
            ICON_ASSETS
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, asset)| *asset)
        })
        .unwrap_or(DEFAULT_ICON_ASSET)
}

/// Read-only store of bundled assets.
#[async_trait]
pub trait AssetBundle: Send + Sync {
    async fn load(&self, asset_name: &str) -> Result<Vec<u8>, AssetError>;
}

pub struct DirectoryAssetBundle {
    root: PathBuf,
}

impl DirectoryAssetBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetBundle for DirectoryAssetBundle {
    async fn load(&self, asset_name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(asset_name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub struct IconResolver {
    assets: Box<dyn AssetBundle>,
    scratch_dir: PathBuf,
}

impl IconResolver {
    pub fn new(assets: Box<dyn AssetBundle>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Copies the icon's asset into the scratch directory. Any failure is
    /// logged and reported as no attachment.
    pub async fn resolve(&self, icon_name: Option<&str>) -> Option<IconAttachment> {
        let asset_name = asset_name_for(icon_name);
        match self.copy_to_scratch(asset_name).await {
            Ok(file_path) => {
                debug!(asset = asset_name, path = %file_path.display(), "icon attachment ready");
                Some(IconAttachment {
                    identifier: icon_name.unwrap_or("default").to_string(),
                    file_path,
                })
            }
            Err(err) => {
                warn!(
                    asset = asset_name,
                    "Icon attachment unavailable, sending without image: {}", err
                );
                None
            }
        }
    }

    async fn copy_to_scratch(&self, asset_name: &str) -> Result<PathBuf, AssetError> {
        let bytes = self.assets.load(asset_name).await?;
        fs::create_dir_all(&self.scratch_dir).await?;
        let file_path = self.scratch_dir.join(asset_name);
        fs::write(&file_path, bytes).await?;
        Ok(file_path)
    }
}
