use serde::{Deserialize, Serialize};

/// Body of `POST /message/sendTextWithGroupBalancing`.
///
/// Transient: built, validated and submitted once per dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancedSendRequest {
    /// Group alias the gateway balances across.
    pub alias: String,
    /// Recipient, digits only (country code included).
    pub number: String,
    pub text: String,
    /// Pre-send delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default)]
    pub mentions_every_one: bool,
    #[serde(default)]
    pub mentioned: Vec<String>,
}

/// Result of a balanced send. `instance_used` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    #[serde(default)]
    pub message: String,
    pub instance_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let req = BalancedSendRequest {
            alias: "sales-01".into(),
            number: "5511999999999".into(),
            text: "hello".into(),
            delay: Some(1000),
            mentions_every_one: false,
            mentioned: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "alias": "sales-01",
                "number": "5511999999999",
                "text": "hello",
                "delay": 1000,
                "mentionsEveryOne": false,
                "mentioned": []
            })
        );
    }

    #[test]
    fn receipt_without_message_id() {
        let receipt: SendReceipt =
            serde_json::from_str(r#"{"message":"sent","instanceUsed":"inst-a"}"#).unwrap();
        assert_eq!(receipt.instance_used, "inst-a");
        assert!(receipt.message_id.is_none());
    }
}
