use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::Notifier;
use crate::domain::types::Notification;
use crate::error::DeliveryError;

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
}

/// Sends plain-text mail through an authenticated STARTTLS relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Validates the sender address and prepares the relay. Nothing is sent
    /// and no connection is opened until the first notification.
    pub fn new(settings: &SmtpSettings) -> anyhow::Result<Self> {
        let from = parse_mailbox(&settings.sender)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self::with_transport(transport, from))
    }

    pub fn with_transport(transport: AsyncSmtpTransport<Tokio1Executor>, from: Mailbox) -> Self {
        Self { transport, from }
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let message = build_message(&self.from, notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        tracing::debug!(subject = %notification.subject, "mail delivered");
        Ok(())
    }
}

pub fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_owned(),
            reason: e.to_string(),
        })
}

fn build_message(from: &Mailbox, notification: &Notification) -> Result<Message, DeliveryError> {
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&notification.recipient)?)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())
        .map_err(|e| DeliveryError::Message(e.to_string()))
}
