//! Error types for the Bookshelf client

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("This result has no ISBN and cannot be imported")]
    MissingIdentifier,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body sent by the backend on non-success responses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Uniform `{message, status}` shape every failure is reduced to before
/// it reaches the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub status: Option<u16>,
}

impl AppError {
    /// Build an error from a non-success HTTP status and its raw body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::BAD_REQUEST => AppError::Validation(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::BusinessRule(message),
            _ => AppError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status associated with this error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Validation(_) => Some(400),
            AppError::NotFound(_) => Some(404),
            AppError::Conflict(_) => Some(409),
            AppError::BusinessRule(_) => Some(422),
            AppError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Reduce to the uniform notice shape
    pub fn to_notice(&self) -> Notice {
        let message = match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BusinessRule(msg) => msg.clone(),
            AppError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Notice {
            message,
            status: self.status(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout(e.to_string())
        } else if e.is_decode() {
            AppError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::from_status(status, "")
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
