use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::domain::repository::{EntropySource, EventPublisher, Notifier, PasswordRepository};
use crate::domain::templates;
use crate::domain::types::RotatingPassword;
use crate::error::CredentialServiceError;
use crate::usecase::code::CodeGenerator;

/// Shape and delivery of rotated passwords.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub length: usize,
    pub recipient: String,
    pub unlock_url: String,
    /// Bus topic that receives every new password value.
    pub topic: String,
}

// ── RotatePassword ───────────────────────────────────────────────────────────

pub struct RotatePasswordUseCase<E, R, N, P>
where
    E: EntropySource,
    R: PasswordRepository,
    N: Notifier,
    P: EventPublisher,
{
    pub generator: CodeGenerator<E>,
    pub passwords: R,
    pub notifier: N,
    pub publisher: P,
    pub policy: RotationPolicy,
}

impl<E, R, N, P> RotatePasswordUseCase<E, R, N, P>
where
    E: EntropySource,
    R: PasswordRepository,
    N: Notifier,
    P: EventPublisher,
{
    pub async fn execute(&self) -> Result<RotatingPassword, CredentialServiceError> {
        self.execute_at(Utc::now()).await
    }

    /// One rotation cycle. The new value is generated before anything is
    /// deactivated, so an entropy failure leaves the current password active.
    /// If the create step fails after deactivation no password is active until
    /// the next cycle; the error is returned, never reported as a rotation.
    pub async fn execute_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RotatingPassword, CredentialServiceError> {
        let value = self.generator.generate(self.policy.length)?;

        let deactivated = self.passwords.deactivate_all_active().await?;
        if deactivated > 1 {
            warn!(deactivated, "found more than one active password");
        }

        let password = match self.passwords.create_active(&value, now).await {
            Ok(password) => password,
            Err(e) => {
                error!(
                    deactivated,
                    error = %e,
                    "previous password deactivated but the new one was not stored; no password is active"
                );
                return Err(e);
            }
        };
        info!(password_id = password.id, deactivated, "rotated password");

        let mail = templates::password_mail(
            &self.policy.recipient,
            &password.password,
            &self.policy.unlock_url,
        );
        if let Err(e) = self.notifier.send(&mail).await {
            warn!(password_id = password.id, error = %e, "failed to deliver password mail");
        }
        if let Err(e) = self
            .publisher
            .publish(&self.policy.topic, &password.password)
            .await
        {
            warn!(password_id = password.id, error = %e, "failed to announce password");
        }
        Ok(password)
    }
}

// ── Scheduler ────────────────────────────────────────────────────────────────

/// Runs one rotation immediately, then one per `interval`, for as long as the
/// future is polled. Cycles never overlap; a failed cycle does not stop the loop.
pub struct RotationScheduler<E, R, N, P>
where
    E: EntropySource,
    R: PasswordRepository,
    N: Notifier,
    P: EventPublisher,
{
    pub usecase: RotatePasswordUseCase<E, R, N, P>,
    pub interval: Duration,
}

impl<E, R, N, P> RotationScheduler<E, R, N, P>
where
    E: EntropySource,
    R: PasswordRepository,
    N: Notifier,
    P: EventPublisher,
{
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "password rotation started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.usecase.execute().await {
                error!(error = %e, kind = e.kind(), "password rotation failed");
            }
        }
    }
}
