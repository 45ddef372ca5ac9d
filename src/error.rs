use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Feed login rejected")]
    Auth,

    #[error("Remote feed error: {0}")]
    Remote(String),

    #[error("Malformed SOAP response: {0}")]
    Soap(String),

    #[error("Catalog write failed: {0}")]
    Write(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Snapshot already exists for run {0}")]
    SnapshotExists(String),
}
