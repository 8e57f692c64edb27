//! Engine error types.

use shop_commerce::CommerceError;
use shop_data::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the remote store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No HTTP response (connection refused, timeout, bad URL).
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        /// `message` or `error` from the response body.
        message: Option<String>,
    },

    /// 2xx response carrying `success: false`.
    #[error("request unsuccessful: {}", .message.as_deref().unwrap_or("no message"))]
    Unsuccessful { message: Option<String> },

    /// Response body didn't have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message the server attached to its refusal, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } | ApiError::Unsuccessful { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Check if the request never reached the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::HttpError { status, .. } => ApiError::Rejected {
                status,
                message: None,
            },
            FetchError::ParseError(msg) | FetchError::JsonError(msg) => ApiError::Decode(msg),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

/// Errors from checkout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The order couldn't be built from the cart and form.
    #[error("{0}")]
    Invalid(#[from] CommerceError),

    /// The server refused the order or couldn't be reached.
    #[error("{message}")]
    Failed { message: String },
}

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file couldn't be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file isn't valid TOML/JSON for the schema.
    #[error("failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// An environment override has an unusable value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let rejected = ApiError::Rejected {
            status: 400,
            message: Some("Out of stock".to_string()),
        };
        assert_eq!(rejected.server_message(), Some("Out of stock"));
        assert_eq!(ApiError::Transport("refused".into()).server_message(), None);
    }

    #[test]
    fn test_from_fetch_error() {
        assert!(ApiError::from(FetchError::Timeout).is_transport());
        assert_eq!(
            ApiError::from(FetchError::ParseError("bad".into())),
            ApiError::Decode("bad".into())
        );
    }
}
