use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal or local files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A host request failed.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// The durable key-value store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The system clipboard could not be reached or written.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
}

/// Failures reported by the filesystem host.
///
/// Cloneable so results can travel through the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("icon extraction failed for {0}")]
    Extraction(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl HostError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => HostError::AccessDenied(path.to_string()),
            std::io::ErrorKind::NotFound => HostError::NotFound(path.to_string()),
            _ => HostError::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Failures of the durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
