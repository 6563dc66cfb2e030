//! Read-through view of the remote instance groups and the mutations that
//! keep it honest.

use std::{future::Future, sync::Arc, time::Duration};

use {
    serde_json::{Value, json},
    switchboard_client::{ClientError, ClientResult, InstanceGroupApi},
    switchboard_common::{Error, Invalidation, Notifier, QueryCache, QueryKey, Result},
    switchboard_protocol::{Ack, CreateInstanceGroup, InstanceGroup, UpdateInstanceGroup},
    tracing::{debug, info, warn},
};

use crate::{filter::GroupFilter, validate};

/// Cache collection shared by every group query.
pub const GROUPS_COLLECTION: &str = "instance-groups";

/// How long a single group read may back the membership guards before it is
/// re-read.
pub const GROUP_STALE_AFTER: Duration = Duration::from_secs(5);

fn list_key() -> QueryKey {
    QueryKey::new(GROUPS_COLLECTION, "fetchInstanceGroups", Value::Null)
}

fn group_key(group_id: &str) -> QueryKey {
    QueryKey::new(GROUPS_COLLECTION, "fetchInstanceGroup", json!({ "id": group_id }))
}

pub struct InstanceGroupService {
    api: Arc<dyn InstanceGroupApi>,
    notifier: Arc<dyn Notifier>,
    lists: QueryCache<Vec<InstanceGroup>>,
    groups: QueryCache<InstanceGroup>,
}

impl InstanceGroupService {
    pub fn new(api: Arc<dyn InstanceGroupApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_stale_after(api, notifier, GROUP_STALE_AFTER)
    }

    /// Single-group reads older than `group_stale_after` are fetched again,
    /// so edits made elsewhere reach the add/remove guards.
    pub fn with_stale_after(
        api: Arc<dyn InstanceGroupApi>,
        notifier: Arc<dyn Notifier>,
        group_stale_after: Duration,
    ) -> Self {
        Self {
            api,
            notifier,
            lists: QueryCache::new(),
            groups: QueryCache::with_stale_after(group_stale_after),
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// Groups in the order the gateway returned them, optionally filtered.
    pub async fn list(&self, filter: Option<&GroupFilter>) -> Result<Vec<InstanceGroup>> {
        let api = Arc::clone(&self.api);
        let groups = self
            .lists
            .get_or_fetch(list_key(), || async move { api.list_groups().await })
            .await
            .map_err(|e| e.into_remote("failed to fetch instance groups"))?;
        Ok(match filter {
            Some(filter) => filter.apply(groups),
            None => groups,
        })
    }

    pub async fn get(&self, group_id: &str) -> Result<InstanceGroup> {
        let api = Arc::clone(&self.api);
        let id = group_id.to_string();
        self.groups
            .get_or_fetch(group_key(group_id), || async move { api.get_group(&id).await })
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::NotFound(format!("instance group {group_id}"))
                } else {
                    e.into_remote("failed to fetch instance group")
                }
            })
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    pub async fn create(&self, spec: &CreateInstanceGroup) -> Result<InstanceGroup> {
        validate::validate_create(spec)?;
        self.mutate(
            "create",
            "instance group created",
            "failed to create instance group",
            self.api.create_group(spec),
        )
        .await
    }

    pub async fn update(
        &self,
        group_id: &str,
        patch: &UpdateInstanceGroup,
    ) -> Result<InstanceGroup> {
        validate::validate_update(patch)?;
        self.mutate(
            "update",
            "instance group updated",
            "failed to update instance group",
            self.api.update_group(group_id, patch),
        )
        .await
    }

    pub async fn delete(&self, group_id: &str) -> Result<Ack> {
        self.mutate(
            "delete",
            "instance group deleted",
            "failed to delete instance group",
            self.api.delete_group(group_id),
        )
        .await
    }

    pub async fn add_instance(&self, group_id: &str, instance_name: &str) -> Result<Ack> {
        let group = self.get(group_id).await?;
        validate::ensure_can_add(&group, instance_name)?;
        self.mutate(
            "add_instance",
            "instance added to group",
            "failed to add instance to group",
            self.api.add_instance(group_id, instance_name),
        )
        .await
    }

    pub async fn remove_instance(&self, group_id: &str, instance_name: &str) -> Result<Ack> {
        let group = self.get(group_id).await?;
        validate::ensure_can_remove(&group, instance_name)?;
        self.mutate(
            "remove_instance",
            "instance removed from group",
            "failed to remove instance from group",
            self.api.remove_instance(group_id, instance_name),
        )
        .await
    }

    /// Await one remote mutation, then either invalidate and notify success
    /// or notify the remote failure. Never both.
    async fn mutate<T>(
        &self,
        action: &'static str,
        success: &str,
        fallback: &str,
        call: impl Future<Output = ClientResult<T>>,
    ) -> Result<T> {
        match call.await {
            Ok(value) => {
                let dropped = self.invalidate().await;
                debug!(action, dropped, "instance group cache invalidated");
                info!(action, "instance group mutation succeeded");
                self.notifier.success(success);
                Ok(value)
            },
            Err(err) => {
                // Decoding only runs on a 2xx reply, so the change was applied.
                if matches!(err, ClientError::Decode(_)) {
                    let dropped = self.invalidate().await;
                    debug!(
                        action,
                        dropped,
                        "instance group cache invalidated after undecodable reply"
                    );
                }
                Err(self.report(action, fallback, err))
            },
        }
    }

    async fn invalidate(&self) -> usize {
        let all = Invalidation::collection(GROUPS_COLLECTION);
        self.lists.invalidate(&all).await + self.groups.invalidate(&all).await
    }

    fn report(&self, action: &'static str, fallback: &str, err: ClientError) -> Error {
        warn!(action, status = ?err.status(), error = %err, "instance group mutation failed");
        let err = err.into_remote(fallback);
        self.notifier.error(&err.to_string());
        err
    }
}
