use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::domain::repository::{EntropySource, EventPublisher, Notifier, OtpRepository};
use crate::domain::templates;
use crate::domain::types::{NewOneTimeCode, OneTimeCode, VerifyOutcome};
use crate::error::{CredentialServiceError, DeliveryError};
use crate::usecase::code::CodeGenerator;

// ── IssueOtp ─────────────────────────────────────────────────────────────────

/// Where and how issued codes are shaped and delivered.
#[derive(Debug, Clone)]
pub struct IssuePolicy {
    pub length: usize,
    pub ttl: Duration,
    pub recipient: String,
    pub unlock_url: String,
}

pub struct IssueOtpUseCase<E, R, N>
where
    E: EntropySource,
    R: OtpRepository,
    N: Notifier,
{
    pub generator: CodeGenerator<E>,
    pub otps: R,
    pub notifier: N,
    pub policy: IssuePolicy,
}

impl<E, R, N> IssueOtpUseCase<E, R, N>
where
    E: EntropySource,
    R: OtpRepository,
    N: Notifier,
{
    pub async fn execute(&self) -> Result<OneTimeCode, CredentialServiceError> {
        self.execute_at(Utc::now()).await
    }

    /// Generate, persist, then notify. Nothing is stored or sent when generation
    /// fails, and nothing is sent when the store rejects the record. A delivery
    /// failure is logged; the stored code stays valid.
    pub async fn execute_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<OneTimeCode, CredentialServiceError> {
        let code = self.generator.generate(self.policy.length)?;
        let otp = self
            .otps
            .save(&NewOneTimeCode::issued_at(code, now, self.policy.ttl))
            .await?;
        info!(otp_id = otp.id, expires_at = %otp.expires_at, "issued otp");

        let mail = templates::otp_mail(&self.policy.recipient, &otp.code, &self.policy.unlock_url);
        if let Err(e) = self.notifier.send(&mail).await {
            warn!(otp_id = otp.id, error = %e, "failed to deliver otp mail");
        }
        Ok(otp)
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

/// Checks a candidate code and reports the outcome on the status topic.
///
/// A verified code is not consumed: it keeps verifying until it expires.
pub struct VerifyOtpUseCase<R, P>
where
    R: OtpRepository,
    P: EventPublisher,
{
    pub otps: R,
    pub publisher: P,
    pub status_topic: String,
}

impl<R, P> VerifyOtpUseCase<R, P>
where
    R: OtpRepository,
    P: EventPublisher,
{
    pub async fn execute(&self, code: &str) -> Result<VerifyOutcome, CredentialServiceError> {
        self.execute_at(code, Utc::now()).await
    }

    /// Store failures propagate as errors and publish nothing.
    pub async fn execute_at(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, CredentialServiceError> {
        let outcome = match self.otps.find_by_code(code).await? {
            None => VerifyOutcome::Invalid,
            Some(otp) if otp.is_expired_at(now) => VerifyOutcome::Expired,
            Some(_) => VerifyOutcome::Verified,
        };

        if let Err(e) = self
            .publisher
            .publish(&self.status_topic, outcome.status_payload())
            .await
        {
            warn!(error = %e, outcome = ?outcome, "failed to publish verification status");
        }
        Ok(outcome)
    }
}

// ── ListOtps ─────────────────────────────────────────────────────────────────

pub struct ListOtpsUseCase<R: OtpRepository> {
    pub otps: R,
}

impl<R: OtpRepository> ListOtpsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<OneTimeCode>, CredentialServiceError> {
        self.otps.list().await
    }
}

// ── SendAlert ────────────────────────────────────────────────────────────────

/// Mails the fixed security alert instead of issuing a code.
pub struct SendAlertUseCase<N: Notifier> {
    pub notifier: N,
    pub recipient: String,
}

impl<N: Notifier> SendAlertUseCase<N> {
    pub async fn execute(&self) -> Result<(), DeliveryError> {
        self.notifier
            .send(&templates::alert_mail(&self.recipient))
            .await
    }
}
