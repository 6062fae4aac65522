use std::time::Duration as StdDuration;

use chrono::Duration;

use otpgate_credential::domain::templates::PASSWORD_SUBJECT;
use otpgate_credential::error::CredentialServiceError;
use otpgate_credential::infra::entropy::OsEntropy;
use otpgate_credential::usecase::code::CodeGenerator;
use otpgate_credential::usecase::rotation::{RotatePasswordUseCase, RotationScheduler};

use crate::helpers::{
    FailingEntropy, MockPasswordRepo, ROTATION_TOPIC, RecordingNotifier, RecordingPublisher,
    RepeatingDigits, active_password, rotation_policy, t0,
};

fn rotator(
    passwords: &MockPasswordRepo,
    notifier: &RecordingNotifier,
    publisher: &RecordingPublisher,
) -> RotatePasswordUseCase<OsEntropy, MockPasswordRepo, RecordingNotifier, RecordingPublisher> {
    RotatePasswordUseCase {
        generator: CodeGenerator::new(OsEntropy),
        passwords: passwords.clone(),
        notifier: notifier.clone(),
        publisher: publisher.clone(),
        policy: rotation_policy(),
    }
}

// ── RotatePassword ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_only_latest_password_active() {
    let passwords = MockPasswordRepo::empty();
    let notifier = RecordingNotifier::new();
    let publisher = RecordingPublisher::new();
    let uc = rotator(&passwords, &notifier, &publisher);

    let mut rotated = Vec::new();
    for minutes in [0, 2, 4] {
        rotated.push(uc.execute_at(t0() + Duration::minutes(minutes)).await.unwrap());
    }

    let records = passwords.snapshot();
    assert_eq!(records.len(), 3);
    assert!(!records[0].is_active);
    assert!(!records[1].is_active);
    assert!(records[2].is_active);
    assert_eq!(passwords.active(), vec![rotated[2].clone()]);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|n| n.subject == PASSWORD_SUBJECT));
    for (mail, password) in sent.iter().zip(&rotated) {
        assert!(mail.body.contains(&password.password));
    }

    let published = publisher.published();
    let expected: Vec<(String, String)> = rotated
        .iter()
        .map(|p| (ROTATION_TOPIC.to_owned(), p.password.clone()))
        .collect();
    assert_eq!(published, expected);
}

#[tokio::test]
async fn should_generate_six_digit_passwords() {
    let passwords = MockPasswordRepo::empty();
    let uc = rotator(&passwords, &RecordingNotifier::new(), &RecordingPublisher::new());

    let password = uc.execute_at(t0()).await.unwrap();

    assert_eq!(password.password.len(), 6);
    assert!(password.password.bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(password.created_at, t0());
}

#[tokio::test]
async fn should_leave_no_active_password_when_create_fails() {
    let passwords =
        MockPasswordRepo::with_records(vec![active_password(1, "111111")]).failing_creates(1);
    let notifier = RecordingNotifier::new();
    let publisher = RecordingPublisher::new();

    let result = rotator(&passwords, &notifier, &publisher)
        .execute_at(t0())
        .await;

    assert!(
        matches!(result, Err(CredentialServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert!(passwords.active().is_empty());
    assert!(notifier.sent().is_empty(), "no mail for an unstored password");
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn should_keep_current_password_when_entropy_unavailable() {
    let passwords = MockPasswordRepo::with_records(vec![active_password(1, "111111")]);
    let notifier = RecordingNotifier::new();
    let uc = RotatePasswordUseCase {
        generator: CodeGenerator::new(FailingEntropy),
        passwords: passwords.clone(),
        notifier: notifier.clone(),
        publisher: RecordingPublisher::new(),
        policy: rotation_policy(),
    };

    let result = uc.execute_at(t0()).await;

    assert!(matches!(result, Err(CredentialServiceError::Generation(_))));
    assert_eq!(passwords.active(), vec![active_password(1, "111111")]);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn should_repair_multiple_active_passwords() {
    let passwords = MockPasswordRepo::with_records(vec![
        active_password(1, "111111"),
        active_password(2, "222222"),
    ]);
    let uc = RotatePasswordUseCase {
        generator: CodeGenerator::new(RepeatingDigits::new("987654")),
        passwords: passwords.clone(),
        notifier: RecordingNotifier::new(),
        publisher: RecordingPublisher::new(),
        policy: rotation_policy(),
    };

    let password = uc.execute_at(t0()).await.unwrap();

    assert_eq!(password.password, "987654");
    assert_eq!(passwords.active(), vec![password]);
    assert_eq!(passwords.snapshot().len(), 3);
}

#[tokio::test]
async fn should_rotate_when_delivery_and_publish_fail() {
    let passwords = MockPasswordRepo::empty();
    let uc = rotator(
        &passwords,
        &RecordingNotifier::failing(),
        &RecordingPublisher::failing(),
    );

    let password = uc.execute_at(t0()).await.unwrap();

    assert_eq!(passwords.active(), vec![password]);
}

// ── Scheduler ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_rotate_immediately_and_then_every_interval() {
    let passwords = MockPasswordRepo::empty();
    let notifier = RecordingNotifier::new();
    let scheduler = RotationScheduler {
        usecase: rotator(&passwords, &notifier, &RecordingPublisher::new()),
        interval: StdDuration::from_secs(120),
    };

    // Ticks at 0s, 120s and 240s fall inside the window.
    let result = tokio::time::timeout(StdDuration::from_secs(250), scheduler.run()).await;

    assert!(result.is_err(), "scheduler never returns on its own");
    let records = passwords.snapshot();
    assert_eq!(records.len(), 3);
    assert_eq!(passwords.active(), vec![records[2].clone()]);
    assert_eq!(notifier.sent().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn should_keep_rotating_after_a_failed_cycle() {
    let passwords =
        MockPasswordRepo::with_records(vec![active_password(1, "111111")]).failing_creates(1);
    let scheduler = RotationScheduler {
        usecase: rotator(&passwords, &RecordingNotifier::new(), &RecordingPublisher::new()),
        interval: StdDuration::from_secs(120),
    };

    let _ = tokio::time::timeout(StdDuration::from_secs(130), scheduler.run()).await;

    let records = passwords.snapshot();
    assert_eq!(records.len(), 2, "first cycle stored nothing, second stored one");
    assert!(!records[0].is_active);
    assert!(records[1].is_active);
}
