use thiserror::Error;

/// Failure to fetch or decode a model or texture.
///
/// Messages are carried as strings so the error stays `Clone` and can be
/// handed to every waiter of a shared load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("unsupported asset format: {0}")]
    Unsupported(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("asset load was cancelled")]
    Cancelled,
}

impl AssetError {
    pub fn decode(path: &str, message: impl ToString) -> Self {
        AssetError::Decode {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &str, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound(path.to_string())
        } else {
            AssetError::Io {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}
