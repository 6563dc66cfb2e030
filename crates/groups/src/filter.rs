use {serde::Serialize, switchboard_protocol::InstanceGroup};

/// Narrows a group listing after it has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFilter {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    pub enabled_only: bool,
}

impl GroupFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn enabled_only(mut self) -> Self {
        self.enabled_only = true;
        self
    }

    pub fn matches(&self, group: &InstanceGroup) -> bool {
        if self.enabled_only && !group.enabled {
            return false;
        }
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = term.to_lowercase();
        group.name.to_lowercase().contains(&needle)
            || group
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, groups: Vec<InstanceGroup>) -> Vec<InstanceGroup> {
        groups.into_iter().filter(|g| self.matches(g)).collect()
    }
}
