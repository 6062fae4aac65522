use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use otpgate_core::response::Envelope;

use crate::domain::types::RotatingPassword;
use crate::error::CredentialServiceError;
use crate::state::AppState;
use crate::usecase::password::GetActivePasswordUseCase;

// ── GET /password ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PasswordResponse {
    pub id: i32,
    pub password: String,
    pub is_active: bool,
    #[serde(serialize_with = "otpgate_core::timestamp::rfc3339_millis")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RotatingPassword> for PasswordResponse {
    fn from(password: RotatingPassword) -> Self {
        Self {
            id: password.id,
            password: password.password,
            is_active: password.is_active,
            created_at: password.created_at,
        }
    }
}

pub async fn get_password(
    State(state): State<AppState>,
) -> Result<Envelope<PasswordResponse>, CredentialServiceError> {
    let usecase = GetActivePasswordUseCase {
        passwords: state.password_repo(),
    };
    let password = usecase.execute().await?;
    Ok(Envelope::new(
        StatusCode::OK,
        "Fetched password successfully",
        password.into(),
    ))
}
