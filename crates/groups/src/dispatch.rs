//! Balanced sends addressed to a group alias.
//!
//! The gateway picks the serving instance. The receipt names it, but nothing
//! here remembers it: the next send is routed from scratch.

use std::sync::Arc;

use {
    switchboard_client::MessageApi,
    switchboard_common::{Invalid, Notifier, Result},
    switchboard_protocol::{BalancedSendRequest, SendReceipt},
    tracing::{info, warn},
};

/// What to send, before it is bound to an alias and checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendText {
    pub number: String,
    pub text: String,
    /// Milliseconds. Negative values are rejected.
    pub delay_ms: Option<i64>,
    pub mentions_every_one: bool,
    pub mentioned: Vec<String>,
}

impl SendText {
    pub fn new(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay_ms: i64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

/// Checks a send and builds the wire request.
pub fn validate_send(alias: &str, send: SendText) -> Result<BalancedSendRequest, Invalid> {
    if alias.trim().is_empty() {
        return Err(Invalid::new("alias", "group alias is required"));
    }
    if send.number.is_empty() || !send.number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Invalid::new("number", "recipient number must contain digits only"));
    }
    if send.text.is_empty() {
        return Err(Invalid::new("text", "message text is required"));
    }
    let delay = match send.delay_ms {
        None => None,
        Some(ms) => Some(
            u64::try_from(ms).map_err(|_| Invalid::new("delay", "delay must not be negative"))?,
        ),
    };
    Ok(BalancedSendRequest {
        alias: alias.to_string(),
        number: send.number,
        text: send.text,
        delay,
        mentions_every_one: send.mentions_every_one,
        mentioned: send.mentioned,
    })
}

pub struct BalancedDispatcher {
    api: Arc<dyn MessageApi>,
    notifier: Arc<dyn Notifier>,
}

impl BalancedDispatcher {
    pub fn new(api: Arc<dyn MessageApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Submit once. Failures are reported, never retried, and no cache is
    /// touched either way.
    pub async fn send(&self, alias: &str, send: SendText) -> Result<SendReceipt> {
        let request = validate_send(alias, send)?;
        match self.api.send_text_with_group_balancing(&request).await {
            Ok(receipt) => {
                info!(
                    alias,
                    instance_used = %receipt.instance_used,
                    message_id = ?receipt.message_id,
                    "balanced send accepted"
                );
                self.notifier
                    .success(&format!("message sent via {}", receipt.instance_used));
                Ok(receipt)
            },
            Err(err) => {
                warn!(alias, status = ?err.status(), error = %err, "balanced send failed");
                let err = err.into_remote("failed to send message");
                self.notifier.error(&err.to_string());
                Err(err)
            },
        }
    }
}
