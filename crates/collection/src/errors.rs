use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("csv row {row}: issue id {value:?} is not an integer")]
    InvalidIssueId { row: usize, value: String },
    #[error("csv export has no `id` column")]
    MissingIdColumn,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("collection document is not a json object")]
    NotAnObject,
    #[error("`{key}` has an unexpected shape: {source}")]
    Shape {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache file {} is corrupt: {reason}", path.display())]
    CorruptCache { path: PathBuf, reason: String },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persisting cache: {0}")]
    Persist(#[from] common::AppError),
}

pub type Result<T> = std::result::Result<T, CollectionError>;
