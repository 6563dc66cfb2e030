use serde::{Deserialize, Serialize};

/// A gateway instance as reported by `GET /instance/fetchInstances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(alias = "instanceName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_jid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<String>,
}

impl Instance {
    pub fn is_connected(&self) -> bool {
        self.connection_status.as_deref() == Some("open")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_instance_name_alias() {
        let inst: Instance =
            serde_json::from_str(r#"{"instanceName":"inst-a","connectionStatus":"open"}"#)
                .unwrap();
        assert_eq!(inst.name, "inst-a");
        assert!(inst.is_connected());
    }
}
