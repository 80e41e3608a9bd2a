use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Deserialize;

// =============================================================================
// Chat Provider Errors
// =============================================================================

/// Non-2xx response returned by the chat provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    /// HTTP status code returned by the provider
    pub status: u16,
    /// Raw response body, passed through verbatim
    pub body: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

impl DeliveryError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The `error.message` field of a JSON error body, if the provider sent one
    pub fn provider_message(&self) -> Option<String> {
        serde_json::from_str::<ProviderErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.error.message)
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.provider_message() {
            Some(message) => write!(f, "Status code {}: {}", self.status, message),
            None => write!(f, "Status code {}: {}", self.status, self.body),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Errors raised by the HipChat client
///
/// Every variant except `Delivery` and `Transport` is a caller contract
/// violation detected before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum HipChatError {
    #[error("No valid HipChat authentication token found.")]
    MissingToken,

    #[error("Missing {0}")]
    MissingRecipient(&'static str),

    #[error("Message too short, must be 1-10,000 chars.")]
    MessageTooShort,

    #[error("Message too long, must be 1-10,000 chars.")]
    MessageTooLong,

    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("HipChat request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HipChatError {
    /// True when the error was raised locally, without touching the network
    pub fn is_precondition(&self) -> bool {
        !matches!(self, HipChatError::Delivery(_) | HipChatError::Transport(_))
    }
}

// =============================================================================
// Endpoint Errors
// =============================================================================

/// Application errors, rendered as plain-text responses
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request form must include a '{0}' key.")]
    MissingField(&'static str),

    #[error("Unknown channel: '{0}'")]
    UnknownChannel(String),

    #[error("Missing {0} environment variable.")]
    MissingConfig(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{}", .0.body)]
    Delivery(DeliveryError),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    GatewayTimeout(String),
}

impl From<HipChatError> for AppError {
    fn from(err: HipChatError) -> Self {
        match err {
            HipChatError::MissingToken => AppError::MissingConfig("HIPCHAT_API_TOKEN"),
            HipChatError::Delivery(e) => AppError::Delivery(e),
            HipChatError::Transport(e) if e.is_timeout() => {
                AppError::GatewayTimeout("Request to HipChat timed out".to_string())
            }
            HipChatError::Transport(e) if e.is_connect() => {
                AppError::Transport("Connection to HipChat failed".to_string())
            }
            HipChatError::Transport(e) => {
                AppError::Transport(format!("HipChat request failed: {}", e))
            }
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownChannel(_) => StatusCode::BAD_REQUEST,
            AppError::MissingConfig(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Delivery(e) => {
                StatusCode::from_u16(e.status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
