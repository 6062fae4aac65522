use chrono::{DateTime, Duration, Utc};

/// A one-time code as stored. `expires_at` is always `created_at + OTP_TTL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// A code is still accepted at the exact instant of `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A one-time code that has not been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOneTimeCode {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewOneTimeCode {
    pub fn issued_at(code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            code,
            created_at: now,
            expires_at: now + ttl,
        }
    }
}

/// One entry of the shared-password rotation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingPassword {
    pub id: i32,
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of checking a candidate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Invalid,
    Expired,
}

impl VerifyOutcome {
    /// Payload published on the verification status topic.
    pub fn status_payload(self) -> &'static str {
        match self {
            Self::Verified => "OTP verified successfully",
            Self::Invalid => "OTP verification failed: Invalid OTP",
            Self::Expired => "OTP verification failed: OTP expired",
        }
    }
}

/// A mail ready to hand to a [`Notifier`](crate::domain::repository::Notifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Raw message received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// What an inbound bus message asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    IssueOtp,
    Alert,
}

/// Length of issued codes and rotated passwords.
pub const CODE_LEN: usize = 6;

/// One-time code time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 300;

/// Delay between password rotations in seconds.
pub const ROTATION_INTERVAL_SECS: u64 = 120;
