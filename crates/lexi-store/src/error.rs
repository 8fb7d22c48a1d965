#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store not available")]
    Unavailable,

    #[error("Invalid store contents: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
