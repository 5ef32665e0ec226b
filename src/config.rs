use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::request::DateTimeComponents;

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// File value first, then the environment variable of the same name.
    pub fn get_or_env(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }
}

/// Whether a scheduled notification fires once or keeps matching
/// date/time components after its first delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatPolicy {
    #[default]
    Once,
    Daily,
    Weekly,
}

impl RepeatPolicy {
    pub fn match_components(self) -> Option<DateTimeComponents> {
        match self {
            RepeatPolicy::Once => None,
            RepeatPolicy::Daily => Some(DateTimeComponents::Time),
            RepeatPolicy::Weekly => Some(DateTimeComponents::DayOfWeekAndTime),
        }
    }
}

impl FromStr for RepeatPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(RepeatPolicy::Once),
            "daily" => Ok(RepeatPolicy::Daily),
            "weekly" => Ok(RepeatPolicy::Weekly),
            other => Err(ConfigError::InvalidValue {
                key: "NOTIFY_REPEAT".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

const DEFAULT_APP_NAME: &str = "training-notifier";
const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
const DEFAULT_ASSET_DIR: &str = "./assets/icons";
const DEFAULT_CATEGORY: &str = "training";
const DEFAULT_THREAD: &str = "training-thread";
const DEFAULT_CHANNEL_ID: &str = "training_channel";
const DEFAULT_CHANNEL_NAME: &str = "Training";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub app_name: String,
    /// IANA name, resolved against the tz database on initialize.
    pub timezone: String,
    pub asset_dir: PathBuf,
    pub attachment_dir: PathBuf,
    pub repeat: RepeatPolicy,
    pub category_identifier: String,
    pub thread_identifier: String,
    pub channel_id: String,
    pub channel_name: String,
    pub permission_granted: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            attachment_dir: env::temp_dir().join(DEFAULT_APP_NAME),
            repeat: RepeatPolicy::Once,
            category_identifier: DEFAULT_CATEGORY.to_string(),
            thread_identifier: DEFAULT_THREAD.to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            permission_granted: true,
        }
    }
}

impl SchedulerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let repeat = match config.get_or_env("NOTIFY_REPEAT") {
            Some(value) => value.parse()?,
            None => defaults.repeat,
        };
        let permission_granted = match config.get_or_env("NOTIFY_PERMISSION") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "granted" => true,
                "denied" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "NOTIFY_PERMISSION".to_string(),
                        value,
                    });
                }
            },
            None => defaults.permission_granted,
        };
        Ok(Self {
            app_name: config
                .get_or_env("NOTIFY_APP_NAME")
                .unwrap_or(defaults.app_name),
            timezone: config
                .get_or_env("NOTIFY_TIMEZONE")
                .unwrap_or(defaults.timezone),
            asset_dir: config
                .get_or_env("NOTIFY_ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_dir),
            attachment_dir: config
                .get_or_env("NOTIFY_ATTACHMENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.attachment_dir),
            repeat,
            category_identifier: config
                .get_or_env("NOTIFY_CATEGORY")
                .unwrap_or(defaults.category_identifier),
            thread_identifier: config
                .get_or_env("NOTIFY_THREAD")
                .unwrap_or(defaults.thread_identifier),
            channel_id: config
                .get_or_env("NOTIFY_CHANNEL_ID")
                .unwrap_or(defaults.channel_id),
            channel_name: config
                .get_or_env("NOTIFY_CHANNEL_NAME")
                .unwrap_or(defaults.channel_name),
            permission_granted,
        })
    }
}
