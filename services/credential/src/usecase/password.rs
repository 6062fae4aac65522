use crate::domain::repository::PasswordRepository;
use crate::domain::types::RotatingPassword;
use crate::error::CredentialServiceError;

pub struct GetActivePasswordUseCase<R: PasswordRepository> {
    pub passwords: R,
}

impl<R: PasswordRepository> GetActivePasswordUseCase<R> {
    pub async fn execute(&self) -> Result<RotatingPassword, CredentialServiceError> {
        self.passwords
            .find_latest_active()
            .await?
            .ok_or(CredentialServiceError::PasswordUnavailable)
    }
}
