use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use otpgate_core::response::Envelope;

use crate::domain::types::{OneTimeCode, VerifyOutcome};
use crate::error::CredentialServiceError;
use crate::state::AppState;
use crate::usecase::otp::{ListOtpsUseCase, VerifyOtpUseCase};

// ── GET / ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OtpResponse {
    pub id: i32,
    pub code: String,
    #[serde(serialize_with = "otpgate_core::timestamp::rfc3339_millis")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "otpgate_core::timestamp::rfc3339_millis")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<OneTimeCode> for OtpResponse {
    fn from(otp: OneTimeCode) -> Self {
        Self {
            id: otp.id,
            code: otp.code,
            created_at: otp.created_at,
            expires_at: otp.expires_at,
        }
    }
}

pub async fn list_otps(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<OtpResponse>>, CredentialServiceError> {
    let usecase = ListOtpsUseCase {
        otps: state.otp_repo(),
    };
    let otps = usecase.execute().await.map_err(|e| match e {
        CredentialServiceError::Internal(cause) => CredentialServiceError::ListUnavailable(cause),
        other => other,
    })?;
    Ok(Envelope::new(
        StatusCode::OK,
        "Fetched OTP records successfully",
        otps.into_iter().map(OtpResponse::from).collect(),
    ))
}

// ── POST /verify-otp ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(alias = "otp")]
    pub otp_code: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Envelope<()>, CredentialServiceError> {
    let Json(body) = body.map_err(|_| CredentialServiceError::InvalidInput)?;
    let usecase = VerifyOtpUseCase {
        otps: state.otp_repo(),
        publisher: state.publisher.clone(),
        status_topic: state.verification_topic.clone(),
    };
    match usecase.execute(&body.otp_code).await? {
        VerifyOutcome::Verified => Ok(Envelope::empty(
            StatusCode::OK,
            VerifyOutcome::Verified.status_payload(),
        )),
        VerifyOutcome::Invalid => Err(CredentialServiceError::InvalidOtp),
        VerifyOutcome::Expired => Err(CredentialServiceError::OtpExpired),
    }
}
