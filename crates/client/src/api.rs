//! One trait per resource family; one method per (resource, verb) pair.
//!
//! Implementations attach the credential, send the request and decode the
//! body. They do not retry and do not interpret failures.

use {
    async_trait::async_trait,
    switchboard_protocol::{
        Ack, BalancedSendRequest, CreateInstanceGroup, Instance, InstanceGroup,
        IntegrationSession, SendReceipt, SessionScope, TargetStatus, UpdateInstanceGroup,
    },
};

use crate::error::ClientResult;

/// `/instance-group` and its `instances` sub-resource.
#[async_trait]
pub trait InstanceGroupApi: Send + Sync {
    async fn list_groups(&self) -> ClientResult<Vec<InstanceGroup>>;
    async fn get_group(&self, group_id: &str) -> ClientResult<InstanceGroup>;
    async fn create_group(&self, spec: &CreateInstanceGroup) -> ClientResult<InstanceGroup>;
    async fn update_group(
        &self,
        group_id: &str,
        patch: &UpdateInstanceGroup,
    ) -> ClientResult<InstanceGroup>;
    async fn delete_group(&self, group_id: &str) -> ClientResult<Ack>;
    async fn add_instance(&self, group_id: &str, instance_name: &str) -> ClientResult<Ack>;
    async fn remove_instance(&self, group_id: &str, instance_name: &str) -> ClientResult<Ack>;
}

/// `/message/sendTextWithGroupBalancing`.
#[async_trait]
pub trait MessageApi: Send + Sync {
    async fn send_text_with_group_balancing(
        &self,
        request: &BalancedSendRequest,
    ) -> ClientResult<SendReceipt>;
}

/// `/instance/fetchInstances`.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    async fn fetch_instances(&self) -> ClientResult<Vec<Instance>>;
}

/// Integration-specific session endpoints.
#[async_trait]
pub trait IntegrationSessionApi: Send + Sync {
    async fn fetch_sessions(&self, scope: &SessionScope) -> ClientResult<Vec<IntegrationSession>>;
    async fn change_session_status(
        &self,
        scope: &SessionScope,
        remote_jid: &str,
        status: TargetStatus,
    ) -> ClientResult<Ack>;
}
