//! Remote gateway client.
//!
//! Every call attaches the `apikey` header when a credential is configured.
//! Failures are classified by status and remote message and handed back
//! unchanged: no retry, no backoff.

pub mod api;
pub mod error;
pub mod http;

pub use {
    api::{InstanceApi, InstanceGroupApi, IntegrationSessionApi, MessageApi},
    error::{ClientError, ClientResult, extract_message},
    http::HttpGatewayClient,
};
