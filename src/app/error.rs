use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification of an [`ApiError`], kept alongside failure
/// messages for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Transport,
    UpstreamStatus(u16),
    MediatorDecode,
    NotFound,
    Exhausted,
    Payload,
}

/// Errors raised while obtaining or decoding an upstream payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Mediator returned an unusable body: {0}")]
    MediatorDecode(String),

    #[error("Post not found")]
    NotFound,

    #[error("{message}")]
    Exhausted { attempts: usize, message: String },

    #[error("Unexpected payload shape: {0}")]
    Payload(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::UpstreamStatus(code) => ErrorKind::UpstreamStatus(*code),
            ApiError::MediatorDecode(_) => ErrorKind::MediatorDecode,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Exhausted { .. } => ErrorKind::Exhausted,
            ApiError::Payload(_) => ErrorKind::Payload,
        }
    }

    /// English text suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout { .. } => {
                "The request took too long. Please try again.".to_string()
            }
            ApiError::Transport(_) => {
                "Could not connect. Check your connection and try again.".to_string()
            }
            ApiError::UpstreamStatus(429) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            ApiError::UpstreamStatus(code) => format!("Failed to load content (HTTP {code})."),
            ApiError::MediatorDecode(_) | ApiError::Payload(_) => {
                "Received an invalid response. Please try again.".to_string()
            }
            ApiError::NotFound => "Post not found".to_string(),
            ApiError::Exhausted { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum KopiteError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KopiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_display() {
        assert_eq!(ApiError::UpstreamStatus(503).to_string(), "HTTP 503");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound.to_string(), "Post not found");
        assert_eq!(ApiError::NotFound.user_message(), "Post not found");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ApiError::Timeout { after_ms: 10 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            ApiError::UpstreamStatus(404).kind(),
            ErrorKind::UpstreamStatus(404)
        );
        let exhausted = ApiError::Exhausted {
            attempts: 3,
            message: "gone".into(),
        };
        assert_eq!(exhausted.kind(), ErrorKind::Exhausted);
        assert_eq!(exhausted.user_message(), "gone");
    }

    #[test]
    fn test_rate_limited_message() {
        assert!(ApiError::UpstreamStatus(429)
            .user_message()
            .contains("Too many requests"));
    }
}
