//! Slack-compatible incoming webhook transport.

use crate::{DeliveryError, SlackMessage, Transport};
use std::time::Duration;
use tracing::debug;

/// Longest prefix of an error response body kept in [`DeliveryError::Status`].
pub const MAX_ERROR_BODY: usize = 512;

/// Posts alerts as JSON to a webhook url.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
}

impl WebhookTransport {
    /// Every request is abandoned after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Http(format!("{}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for WebhookTransport {
    async fn send(&self, target: &str, message: &SlackMessage) -> Result<(), DeliveryError> {
        debug!("Posting alert to webhook");

        let mut response = self
            .client
            .post(target)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Http(format!("{}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = Vec::new();
            while body.len() < MAX_ERROR_BODY {
                match response.chunk().await {
                    Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                    Ok(None) | Err(_) => break,
                }
            }
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY),
            });
        }

        Ok(())
    }
}

/// Lossy utf-8 text of at most `max` bytes of `body`, cut on a char boundary.
fn truncate_body(body: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(&body[..body.len().min(max)]);
    let text = text.trim_end_matches(char::REPLACEMENT_CHARACTER);

    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
