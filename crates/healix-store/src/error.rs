use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history path is a directory: {0}")]
    NotAFile(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("history lock poisoned")]
    Poisoned,
}
