#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{NewOneTimeCode, Notification, OneTimeCode, RotatingPassword};
use crate::error::{CredentialServiceError, DeliveryError, GenerationError, PublishError};

/// Repository for issued one-time codes.
pub trait OtpRepository: Send + Sync {
    /// Persist a new code; the store assigns the id.
    async fn save(&self, otp: &NewOneTimeCode) -> Result<OneTimeCode, CredentialServiceError>;

    /// Exact match on the code value. When the same value was issued more than
    /// once, the most recently issued record wins.
    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<OneTimeCode>, CredentialServiceError>;

    /// Every stored code, oldest first.
    async fn list(&self) -> Result<Vec<OneTimeCode>, CredentialServiceError>;
}

/// Repository for the rotating shared password.
pub trait PasswordRepository: Send + Sync {
    /// Flip every active record to inactive. Returns how many were changed.
    async fn deactivate_all_active(&self) -> Result<u64, CredentialServiceError>;

    /// Insert a new record with `is_active = true`.
    async fn create_active(
        &self,
        password: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RotatingPassword, CredentialServiceError>;

    /// The most recently created active record, if any.
    async fn find_latest_active(&self) -> Result<Option<RotatingPassword>, CredentialServiceError>;
}

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GenerationError>;
}

/// Outbound mail channel.
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Outbound side of the message bus.
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}
