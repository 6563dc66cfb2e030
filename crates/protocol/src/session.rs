use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Stored status of an integration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Opened,
    Paused,
    Closed,
}

impl SessionStatus {
    pub const ALL: [Self; 3] = [Self::Opened, Self::Paused, Self::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Paused => "paused",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a status change. `Delete` removes the session instead of
/// storing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Opened,
    Paused,
    Closed,
    Delete,
}

impl TargetStatus {
    pub const ALL: [Self; 4] = [Self::Opened, Self::Paused, Self::Closed, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Paused => "paused",
            Self::Closed => "closed",
            Self::Delete => "delete",
        }
    }

    /// The stored status this target corresponds to, if any.
    pub fn as_status(self) -> Option<SessionStatus> {
        match self {
            Self::Opened => Some(SessionStatus::Opened),
            Self::Paused => Some(SessionStatus::Paused),
            Self::Closed => Some(SessionStatus::Closed),
            Self::Delete => None,
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!("unknown session status '{s}' (expected opened, paused, closed or delete)")
            })
    }
}

/// Automation integrations that keep per-conversation sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Integration {
    #[serde(rename = "n8n")]
    N8n,
    #[serde(rename = "typebot")]
    Typebot,
    #[serde(rename = "dify")]
    Dify,
    #[serde(rename = "evolutionBot")]
    EvolutionBot,
    #[serde(rename = "flowise")]
    Flowise,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "evoai")]
    EvoAi,
}

impl Integration {
    pub const ALL: [Self; 7] = [
        Self::N8n,
        Self::Typebot,
        Self::Dify,
        Self::EvolutionBot,
        Self::Flowise,
        Self::OpenAi,
        Self::EvoAi,
    ];

    /// Route prefix of the integration's endpoints.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::N8n => "n8n",
            Self::Typebot => "typebot",
            Self::Dify => "dify",
            Self::EvolutionBot => "evolutionBot",
            Self::Flowise => "flowise",
            Self::OpenAi => "openai",
            Self::EvoAi => "evoai",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Integration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.path_segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown integration '{s}'"))
    }
}

/// Which integration bot on which instance a session list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScope {
    pub integration: Integration,
    pub bot_id: String,
    pub instance_name: String,
}

/// Per-conversation automation state, identified by `(remote_jid, session_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSession {
    pub remote_jid: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    pub status: SessionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_status_parses_wire_names() {
        assert_eq!("delete".parse::<TargetStatus>().unwrap(), TargetStatus::Delete);
        assert_eq!("paused".parse::<TargetStatus>().unwrap(), TargetStatus::Paused);
        assert!("archived".parse::<TargetStatus>().is_err());
        assert_eq!(
            serde_json::to_value(TargetStatus::Delete).unwrap(),
            serde_json::json!("delete")
        );
    }

    #[test]
    fn integration_round_trips_through_display() {
        for integration in Integration::ALL {
            assert_eq!(
                integration.to_string().parse::<Integration>().unwrap(),
                integration
            );
        }
        assert_eq!("EVOLUTIONBOT".parse::<Integration>().unwrap(), Integration::EvolutionBot);
    }

    #[test]
    fn decodes_session_row() {
        let raw = r#"{
            "id": "s1",
            "remoteJid": "5511999999999@s.whatsapp.net",
            "pushName": "Ana",
            "sessionId": "abc",
            "status": "paused"
        }"#;
        let session: IntegrationSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.push_name.as_deref(), Some("Ana"));
    }
}
