use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::repository::{EntropySource, Notifier, OtpRepository};
use crate::domain::types::{BusMessage, Trigger};
use crate::usecase::otp::{IssueOtpUseCase, SendAlertUseCase};

/// Maps inbound bus topics to engine actions.
#[derive(Debug, Clone)]
pub struct TopicRoutes {
    pub issue_topic: String,
    /// `None` when the alert branch is disabled.
    pub alert_topic: Option<String>,
}

impl TopicRoutes {
    /// Topics to subscribe to.
    pub fn topics(&self) -> Vec<String> {
        std::iter::once(self.issue_topic.clone())
            .chain(self.alert_topic.clone())
            .collect()
    }

    /// The alert route is checked first, so it wins if both share a topic.
    pub fn classify(&self, topic: &str) -> Option<Trigger> {
        if self.alert_topic.as_deref() == Some(topic) {
            Some(Trigger::Alert)
        } else if self.issue_topic == topic {
            Some(Trigger::IssueOtp)
        } else {
            None
        }
    }
}

/// Consumes bus messages one at a time and runs the matching action.
/// Payloads are not inspected.
pub struct TriggerDispatcher<E, R, N>
where
    E: EntropySource,
    R: OtpRepository,
    N: Notifier,
{
    pub routes: TopicRoutes,
    pub issue: IssueOtpUseCase<E, R, N>,
    pub alert: SendAlertUseCase<N>,
}

impl<E, R, N> TriggerDispatcher<E, R, N>
where
    E: EntropySource,
    R: OtpRepository,
    N: Notifier,
{
    /// Handle one message. Failures are logged; nothing is returned to the sender.
    pub async fn handle(&self, message: &BusMessage) -> Option<Trigger> {
        let trigger = self.routes.classify(&message.topic);
        match trigger {
            Some(Trigger::IssueOtp) => {
                if let Err(e) = self.issue.execute().await {
                    error!(
                        topic = %message.topic,
                        error = %e,
                        kind = e.kind(),
                        "otp issuance failed"
                    );
                }
            }
            Some(Trigger::Alert) => match self.alert.execute().await {
                Ok(()) => info!(topic = %message.topic, "security alert sent"),
                Err(e) => {
                    warn!(topic = %message.topic, error = %e, "failed to deliver security alert")
                }
            },
            None => debug!(topic = %message.topic, "ignoring message on unrouted topic"),
        }
        trigger
    }

    /// Drain `rx` until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<BusMessage>) {
        while let Some(message) = rx.recv().await {
            self.handle(&message).await;
        }
        info!("trigger channel closed");
    }
}
