use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("symptom catalog is empty")]
    EmptyCatalog,

    #[error("blank symptom identifier at catalog index {0}")]
    BlankSymptom(usize),

    #[error("duplicate symptom identifier in catalog: {0}")]
    DuplicateSymptom(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("remedy table not found: {0}")]
    RemedyTableNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
