//! Low-balance alerts.
//!
//! An [`AlertMessage`] is rendered into a Slack-compatible [`SlackMessage`]
//! and handed to a [`Transport`] by the [`Dispatcher`]. Without a configured
//! destination the dispatcher writes the rendered alert to the log instead.

pub mod dispatcher;
pub mod webhook;

pub use dispatcher::{Delivery, Dispatcher};
pub use webhook::WebhookTransport;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Headline of every alert.
pub const ALERT_TITLE: &str = "⚠️ Balance Alert ⚠️";

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("alert request failed: {0}")]
    Http(String),

    #[error("alert request timed out")]
    Timeout,

    #[error("alert endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to render alert: {0}")]
    Render(#[from] serde_json::Error),
}

/// A detected low balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub address: String,
    pub chain_name: String,
    pub chain_id: u64,
    pub symbol: String,
    /// Current balance as rendered by the normalizer
    pub balance: String,
    /// Threshold exactly as configured
    pub threshold: String,
}

impl AlertMessage {
    /// `"<name> (<id>)"`
    pub fn chain_label(&self) -> String {
        format!("{} ({})", self.chain_name, self.chain_id)
    }
}

/// Slack incoming-webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn short(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short: true,
        }
    }
}

impl From<&AlertMessage> for SlackMessage {
    fn from(alert: &AlertMessage) -> Self {
        Self {
            text: ALERT_TITLE.to_string(),
            attachments: vec![Attachment {
                fields: vec![
                    Field::short("Address", alert.address.as_str()),
                    Field::short("Chain", alert.chain_label()),
                    Field::short("Token", alert.symbol.as_str()),
                    Field::short("Current Balance", alert.balance.as_str()),
                    Field::short("Threshold", alert.threshold.as_str()),
                ],
            }],
        }
    }
}

/// Delivery channel for rendered alerts.
pub trait Transport: Send + Sync {
    /// Make one delivery attempt of `message` to `target`.
    fn send(
        &self,
        target: &str,
        message: &SlackMessage,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}
