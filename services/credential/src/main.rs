use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use otpgate_core::config::{Config, load_dotenv};
use otpgate_core::tracing::init_tracing;
use otpgate_credential::config::CredentialConfig;
use otpgate_credential::domain::repository::EventPublisher;
use otpgate_credential::infra::db::{DbOtpRepository, DbPasswordRepository};
use otpgate_credential::infra::entropy::OsEntropy;
use otpgate_credential::infra::mail::{SmtpNotifier, SmtpSettings};
use otpgate_credential::infra::mqtt::{self, MqttSettings};
use otpgate_credential::router::build_router;
use otpgate_credential::state::AppState;
use otpgate_credential::usecase::code::CodeGenerator;
use otpgate_credential::usecase::otp::{IssueOtpUseCase, IssuePolicy, SendAlertUseCase};
use otpgate_credential::usecase::rotation::{
    RotatePasswordUseCase, RotationPolicy, RotationScheduler,
};
use otpgate_credential::usecase::trigger::{TopicRoutes, TriggerDispatcher};
use otpgate_credential_migration::Migrator;

/// Bus messages buffered between the MQTT event loop and the dispatcher.
const TRIGGER_QUEUE: usize = 64;

#[tokio::main]
async fn main() {
    // RUST_LOG may come from .env, so load it before the subscriber reads it.
    load_dotenv();
    init_tracing();

    let config = CredentialConfig::from_env();
    config.validate().expect("invalid configuration");

    let db = Database::connect(&config.database_url())
        .await
        .expect("failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");

    let notifier = SmtpNotifier::new(&SmtpSettings {
        host: config.smtp_host.clone(),
        port: config.smtp_port,
        sender: config.smtp_email.clone(),
        password: config.smtp_password.clone(),
    })
    .expect("invalid SMTP configuration");

    let routes = TopicRoutes {
        issue_topic: config.issue_topic.clone(),
        alert_topic: config.alert_topic().map(str::to_owned),
    };
    let (publisher, subscription) = mqtt::connect(
        &MqttSettings {
            host: config.mqtt_broker_url.clone(),
            port: config.mqtt_port,
            tls: config.mqtt_tls,
            client_id: config.mqtt_client_id.clone(),
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
        },
        routes.topics(),
    )
    .await
    .expect("failed to connect to MQTT broker");

    if let Err(e) = publisher.publish(&config.announce_topic, "hello").await {
        warn!(error = %e, "failed to announce startup");
    }

    // Bus → dispatcher
    let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_QUEUE);
    let forwarder = tokio::spawn(subscription.forward_messages(trigger_tx));
    let dispatcher = TriggerDispatcher {
        routes,
        issue: IssueOtpUseCase {
            generator: CodeGenerator::new(OsEntropy),
            otps: DbOtpRepository { db: db.clone() },
            notifier: notifier.clone(),
            policy: IssuePolicy {
                length: config.otp_length,
                ttl: chrono::Duration::seconds(config.otp_ttl_secs),
                recipient: config.to_email.clone(),
                unlock_url: config.unlock_url.clone(),
            },
        },
        alert: SendAlertUseCase {
            notifier: notifier.clone(),
            recipient: config.to_email.clone(),
        },
    };
    let dispatch = tokio::spawn(dispatcher.run(trigger_rx));

    // Timer → rotation
    let rotation = config.rotation_enabled.then(|| {
        let scheduler = RotationScheduler {
            usecase: RotatePasswordUseCase {
                generator: CodeGenerator::new(OsEntropy),
                passwords: DbPasswordRepository { db: db.clone() },
                notifier: notifier.clone(),
                publisher: publisher.clone(),
                policy: RotationPolicy {
                    length: config.otp_length,
                    recipient: config.to_email.clone(),
                    unlock_url: config.unlock_url.clone(),
                    topic: config.rotation_topic.clone(),
                },
            },
            interval: Duration::from_secs(config.rotation_interval_secs),
        };
        tokio::spawn(scheduler.run())
    });
    if rotation.is_none() {
        info!("password rotation disabled");
    }

    // HTTP → verification
    let state = AppState {
        db,
        publisher,
        verification_topic: config.verification_topic.clone(),
    };
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("credential service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    forwarder.abort();
    dispatch.abort();
    if let Some(rotation) = rotation {
        rotation.abort();
    }
    info!("credential service stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
