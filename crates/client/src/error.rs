use {serde_json::Value, switchboard_common::Error, thiserror::Error};

/// A failed gateway call, classified but otherwise uninterpreted.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("gateway returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    /// The message the gateway put in the error body, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Convert into the coordinator-level error, keeping the remote message
    /// verbatim and falling back to `fallback` when there is none. Transport
    /// and decode failures stay reachable through `source()`.
    pub fn into_remote(self, fallback: &str) -> Error {
        let status = self.status();
        let message = self.remote_message().unwrap_or(fallback).to_string();
        let source: Option<Box<dyn std::error::Error + Send + Sync>> = match self {
            Self::Status { .. } => None,
            other => Some(Box::new(other)),
        };
        Error::Remote {
            status,
            message,
            source,
        }
    }
}

/// Pull a human-readable message out of a gateway error body.
///
/// Checked in order: `message`, `response.message`, `error`. Message arrays
/// are joined with `", "`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    [
        value.get("message"),
        value.get("response").and_then(|r| r.get("message")),
        value.get("error"),
    ]
    .into_iter()
    .flatten()
    .find_map(message_text)
}

fn message_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}
