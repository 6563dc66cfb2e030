use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// A named, aliased set of gateway instances used as one dispatch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    pub id: String,
    pub name: String,
    /// Routing key for balanced dispatch.
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub instances: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InstanceGroup {
    /// Exact, case-sensitive membership check.
    pub fn has_member(&self, instance_name: &str) -> bool {
        self.instances.iter().any(|i| i == instance_name)
    }

    pub fn member_count(&self) -> usize {
        self.instances.len()
    }
}

fn default_enabled() -> bool {
    true
}

/// Body of `POST /instance-group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceGroup {
    pub name: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub instances: Vec<String>,
}

impl CreateInstanceGroup {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, instances: Vec<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            description: None,
            enabled: true,
            instances,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Body of `PUT /instance-group/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<String>>,
}

impl UpdateInstanceGroup {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.alias.is_none()
            && self.description.is_none()
            && self.enabled.is_none()
            && self.instances.is_none()
    }
}

/// Body of the add/remove member calls on `/instance-group/{id}/instances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub instance_name: String,
}

/// Acknowledgement returned by delete-style and sub-resource calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}
