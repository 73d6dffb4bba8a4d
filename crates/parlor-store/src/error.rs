//! Error types for the store layer.

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The username is already taken. Registration uniqueness is enforced
    /// here, under the store's write lock, not in the handler.
    #[error("user {0} already exists")]
    AlreadyExists(String),

    /// No account with that username.
    #[error("user {0} not found")]
    NotFound(String),

    /// Reading or writing the backing file failed. The in-memory state
    /// was rolled back, so the failed write is not observable as success.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be serialized or parsed.
    #[error("store serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
