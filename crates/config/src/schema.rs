use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub gateway: GatewayConfig,
    pub instances: InstancesConfig,
}

/// Where the gateway lives and how to talk to it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway API, without a trailing path.
    pub base_url: String,

    /// Global API credential. Calls go out unauthenticated when unset.
    pub api_key: Option<String>,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Background refresh of the instance listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancesConfig {
    pub refresh_interval_secs: u64,
    pub stale_after_secs: u64,
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 15,
            stale_after_secs: 5,
        }
    }
}

impl InstancesConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: SwitchboardConfig = toml::from_str(
            r#"
            [gateway]
            base_url = "https://gw.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gateway.base_url, "https://gw.example.com");
        assert_eq!(cfg.gateway.timeout_secs, 30);
        assert!(cfg.gateway.api_key.is_none());
        assert_eq!(cfg.instances.refresh_interval(), Duration::from_secs(15));
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = GatewayConfig {
            api_key: Some("super-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn zero_refresh_interval_is_clamped() {
        let cfg = InstancesConfig {
            refresh_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(1));
    }
}
