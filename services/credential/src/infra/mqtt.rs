use std::time::Duration;

use anyhow::{Context as _, bail};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, Publish, QoS, Transport,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::domain::repository::EventPublisher;
use crate::domain::types::BusMessage;
use crate::error::PublishError;

/// Capacity of the client's outgoing request queue.
const REQUEST_CAPACITY: usize = 64;

/// Delay before polling again after a connection error. rumqttc reconnects on
/// the next poll.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

impl MqttSettings {
    pub fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_credentials(&self.username, &self.password);
        options.set_keep_alive(Duration::from_secs(30));
        if self.tls {
            options.set_transport(Transport::tls_with_default_config());
        }
        options
    }
}

/// Publishing half of the bus connection. Cheap to clone.
///
/// Publishes are queued to the event loop without waiting. When the queue is
/// full (the event loop is reconnecting or backed up) the publish fails
/// immediately instead of stalling the caller.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl EventPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| PublishError {
                topic: topic.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// Receiving half of the bus connection.
pub struct MqttSubscription {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Vec<String>,
}

/// Connect to the broker and subscribe to `topics`.
///
/// Returns once the broker has accepted the connection; an error here means the
/// service must not start.
pub async fn connect(
    settings: &MqttSettings,
    topics: Vec<String>,
) -> anyhow::Result<(MqttPublisher, MqttSubscription)> {
    let (client, mut eventloop) = AsyncClient::new(settings.options(), REQUEST_CAPACITY);

    loop {
        let event = eventloop
            .poll()
            .await
            .with_context(|| {
                format!("connect to mqtt broker {}:{}", settings.host, settings.port)
            })?;
        if let Event::Incoming(Packet::ConnAck(ack)) = event {
            if ack.code != ConnectReturnCode::Success {
                bail!("mqtt broker refused connection: {:?}", ack.code);
            }
            break;
        }
    }
    info!(host = %settings.host, port = settings.port, "connected to mqtt broker");

    subscribe_all(&client, &topics)?;
    let subscription = MqttSubscription {
        client: client.clone(),
        eventloop,
        topics,
    };
    Ok((MqttPublisher::new(client), subscription))
}

/// Queue a subscribe request per topic without waiting on the request queue.
/// The event loop sends them on its next polls.
fn subscribe_all(client: &AsyncClient, topics: &[String]) -> anyhow::Result<()> {
    for topic in topics {
        client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .with_context(|| format!("subscribe to {topic}"))?;
        info!(topic = %topic, "subscribed");
    }
    Ok(())
}

/// Outcome of handing one inbound message to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forwarded {
    Queued,
    Dropped,
    Closed,
}

/// Hand `message` to the dispatcher without blocking the event loop. A full
/// channel drops the message with a warning.
fn forward(tx: &mpsc::Sender<BusMessage>, message: BusMessage) -> Forwarded {
    match tx.try_send(message) {
        Ok(()) => Forwarded::Queued,
        Err(TrySendError::Full(message)) => {
            warn!(topic = %message.topic, "trigger queue full; dropping message");
            Forwarded::Dropped
        }
        Err(TrySendError::Closed(_)) => Forwarded::Closed,
    }
}

impl MqttSubscription {
    /// Drive the connection, forwarding every inbound publish into `tx`.
    ///
    /// Runs until `tx` is closed. Subscriptions are renewed after each reconnect.
    /// Nothing here waits on the dispatcher or on the client request queue, so
    /// the event loop keeps draining outbound publishes.
    pub async fn forward_messages(mut self, tx: mpsc::Sender<BusMessage>) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if forward(&tx, to_bus_message(publish)) == Forwarded::Closed {
                        info!("trigger channel closed; stopping mqtt forwarder");
                        return;
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("reconnected to mqtt broker");
                    if let Err(e) = subscribe_all(&self.client, &self.topics) {
                        warn!(error = %e, "failed to renew subscriptions");
                    }
                }
                Ok(event) => debug!(?event, "mqtt event"),
                Err(e) => {
                    warn!(error = %e, "mqtt connection error");
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                }
            }
        }
    }
}

fn to_bus_message(publish: Publish) -> BusMessage {
    BusMessage {
        topic: publish.topic,
        payload: publish.payload.to_vec(),
    }
}
