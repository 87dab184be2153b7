use crate::{AlertMessage, DeliveryError, SlackMessage, Transport};
use tracing::{info, warn};

/// How an alert left the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No destination configured; the alert was written to the log.
    Logged,
    /// The transport accepted the alert.
    Sent,
}

impl Delivery {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Logged => "logged",
            Self::Sent => "sent",
        }
    }
}

/// Sends alerts to the configured destination, or logs them when there is
/// none.
pub struct Dispatcher<T> {
    transport: T,
    target: Option<String>,
}

impl<T> Dispatcher<T>
where
    T: Transport,
{
    /// Blank targets count as unset.
    pub fn new(transport: T, target: Option<&str>) -> Self {
        let target = target
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .map(str::to_string);

        Self { transport, target }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Deliver one alert. Exactly one transport attempt is made when a target
    /// is configured; none otherwise.
    pub async fn dispatch(&self, alert: &AlertMessage) -> Result<Delivery, DeliveryError> {
        let message = SlackMessage::from(alert);

        let Some(target) = self.target.as_deref() else {
            let rendered = serde_json::to_string_pretty(&message)?;
            warn!("Alert webhook is not configured, logging alert:\n{}", rendered);
            warn!(
                address = %alert.address,
                chain_id = alert.chain_id,
                "Alert would be sent for {} on {}",
                alert.address,
                alert.chain_label()
            );
            return Ok(Delivery::Logged);
        };

        self.transport.send(target, &message).await?;
        info!(
            address = %alert.address,
            chain_id = alert.chain_id,
            "Alert sent for {} on {}",
            alert.address,
            alert.chain_label()
        );

        Ok(Delivery::Sent)
    }
}
