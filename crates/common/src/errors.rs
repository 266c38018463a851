pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid tracker url {0}")]
    InvalidTrackerUrl(String),
    #[error("the download action needs tracker credentials (url userinfo, --username or TRACKER_STATS_TRACKER__USERNAME)")]
    MissingCredentials,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
