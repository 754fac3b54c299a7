use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid error pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cannot list clients under {}: {source}", path.display())]
    ListClients {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;
