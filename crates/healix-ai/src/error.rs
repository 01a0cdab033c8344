use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("failed to load artifacts from {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("classifier {model} failed: {reason}")]
    Inference { model: String, reason: String },
}

impl EngineError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
