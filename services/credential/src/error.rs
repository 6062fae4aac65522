use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use otpgate_core::response::Envelope;

/// The entropy source could not produce random bytes.
#[derive(Debug, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct GenerationError(pub String);

/// A notification could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid mail address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// The bus client refused an outbound message.
#[derive(Debug, thiserror::Error)]
#[error("failed to publish on {topic}: {reason}")]
pub struct PublishError {
    pub topic: String,
    pub reason: String,
}

/// Credential service error variants.
#[derive(Debug, thiserror::Error)]
pub enum CredentialServiceError {
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("OTP expired")]
    OtpExpired,
    #[error("Invalid input")]
    InvalidInput,
    #[error("failed to get password")]
    PasswordUnavailable,
    #[error("Error fetching OTP records")]
    ListUnavailable(#[source] anyhow::Error),
    #[error("code generation failed")]
    Generation(#[from] GenerationError),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl CredentialServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOtp => "INVALID_OTP",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::InvalidInput => "INVALID_INPUT",
            Self::PasswordUnavailable => "PASSWORD_UNAVAILABLE",
            Self::ListUnavailable(_) => "LIST_UNAVAILABLE",
            Self::Generation(_) => "GENERATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidOtp | Self::OtpExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::PasswordUnavailable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ListUnavailable(_) | Self::Generation(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CredentialServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected outcomes; only 500s carry a cause worth logging.
        let cause = match &self {
            Self::Internal(e) | Self::ListUnavailable(e) => Some(format!("{e:#}")),
            Self::Generation(e) => Some(e.to_string()),
            _ => None,
        };
        if let Some(cause) = cause {
            tracing::error!(error = %cause, kind = self.kind(), "internal error");
        }
        let message = match &self {
            Self::Generation(_) => "internal server error".to_owned(),
            other => other.to_string(),
        };
        Envelope::empty(status, message).into_response()
    }
}
