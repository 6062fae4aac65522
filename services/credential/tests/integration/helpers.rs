use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use otpgate_credential::domain::repository::{
    EntropySource, EventPublisher, Notifier, OtpRepository, PasswordRepository,
};
use otpgate_credential::domain::types::{
    NewOneTimeCode, Notification, OneTimeCode, RotatingPassword,
};
use otpgate_credential::error::{
    CredentialServiceError, DeliveryError, GenerationError, PublishError,
};
use otpgate_credential::usecase::otp::IssuePolicy;
use otpgate_credential::usecase::rotation::RotationPolicy;

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOtpRepo {
    pub records: Arc<Mutex<Vec<OneTimeCode>>>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MockOtpRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<OneTimeCode> {
        self.records.lock().unwrap().clone()
    }
}

impl OtpRepository for MockOtpRepo {
    async fn save(&self, otp: &NewOneTimeCode) -> Result<OneTimeCode, CredentialServiceError> {
        if self.fail_writes {
            return Err(anyhow::anyhow!("insert otp: connection reset").into());
        }
        let mut records = self.records.lock().unwrap();
        let record = OneTimeCode {
            id: records.len() as i32 + 1,
            code: otp.code.clone(),
            created_at: otp.created_at,
            expires_at: otp.expires_at,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<OneTimeCode>, CredentialServiceError> {
        if self.fail_reads {
            return Err(anyhow::anyhow!("find otp by code: connection reset").into());
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|o| o.code == code)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<OneTimeCode>, CredentialServiceError> {
        if self.fail_reads {
            return Err(anyhow::anyhow!("list otps: connection reset").into());
        }
        Ok(self.snapshot())
    }
}

// ── MockPasswordRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPasswordRepo {
    pub records: Arc<Mutex<Vec<RotatingPassword>>>,
    /// Number of upcoming `create_active` calls that fail.
    pub create_failures: Arc<Mutex<u32>>,
}

impl MockPasswordRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RotatingPassword>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    pub fn failing_creates(self, count: u32) -> Self {
        *self.create_failures.lock().unwrap() = count;
        self
    }

    pub fn snapshot(&self) -> Vec<RotatingPassword> {
        self.records.lock().unwrap().clone()
    }

    pub fn active(&self) -> Vec<RotatingPassword> {
        self.snapshot().into_iter().filter(|p| p.is_active).collect()
    }
}

impl PasswordRepository for MockPasswordRepo {
    async fn deactivate_all_active(&self) -> Result<u64, CredentialServiceError> {
        let mut records = self.records.lock().unwrap();
        let mut changed = 0;
        for record in records.iter_mut().filter(|p| p.is_active) {
            record.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn create_active(
        &self,
        password: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RotatingPassword, CredentialServiceError> {
        {
            let mut failures = self.create_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(anyhow::anyhow!("insert active password: disk full").into());
            }
        }
        let mut records = self.records.lock().unwrap();
        let record = RotatingPassword {
            id: records.len() as i32 + 1,
            password: password.to_owned(),
            is_active: true,
            created_at,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn find_latest_active(&self) -> Result<Option<RotatingPassword>, CredentialServiceError> {
        Ok(self.active().into_iter().max_by_key(|p| p.id))
    }
}

// ── RecordingNotifier ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Notification>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Transport("535 authentication failed".to_owned()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ── RecordingPublisher ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub published: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        if self.fail {
            return Err(PublishError {
                topic: topic.to_owned(),
                reason: "client disconnected".to_owned(),
            });
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_owned(), payload.to_owned()));
        Ok(())
    }
}

// ── Entropy ──────────────────────────────────────────────────────────────────

/// Fills every buffer by cycling through a fixed digit sequence, so a
/// generator produces that sequence on every call.
pub struct RepeatingDigits(pub Vec<u8>);

impl RepeatingDigits {
    pub fn new(digits: &str) -> Self {
        Self(digits.bytes().map(|b| b - b'0').collect())
    }
}

impl EntropySource for RepeatingDigits {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GenerationError> {
        for (slot, value) in buf.iter_mut().zip(self.0.iter().cycle()) {
            *slot = *value;
        }
        Ok(())
    }
}

pub struct FailingEntropy;

impl EntropySource for FailingEntropy {
    fn fill(&self, _buf: &mut [u8]) -> Result<(), GenerationError> {
        Err(GenerationError("getrandom: unavailable".to_owned()))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const RECIPIENT: &str = "ops@example.com";
pub const UNLOCK_URL: &str = "http://127.0.0.1:5500/gen-otp-ui/index.html";
pub const VERIFICATION_TOPIC: &str = "otp/verification";
pub const ROTATION_TOPIC: &str = "Project2/OTP";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
}

pub fn issue_policy() -> IssuePolicy {
    IssuePolicy {
        length: 6,
        ttl: Duration::minutes(5),
        recipient: RECIPIENT.to_owned(),
        unlock_url: UNLOCK_URL.to_owned(),
    }
}

pub fn rotation_policy() -> RotationPolicy {
    RotationPolicy {
        length: 6,
        recipient: RECIPIENT.to_owned(),
        unlock_url: UNLOCK_URL.to_owned(),
        topic: ROTATION_TOPIC.to_owned(),
    }
}

pub fn active_password(id: i32, value: &str) -> RotatingPassword {
    RotatingPassword {
        id,
        password: value.to_owned(),
        is_active: true,
        created_at: t0(),
    }
}
