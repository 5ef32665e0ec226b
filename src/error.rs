use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Platform not initialized")]
    NotInitialized,

    #[error("Failed to display notification: {0}")]
    Display(String),

    #[error("Schedule rejected: {0}")]
    Schedule(String),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
